use std::sync::Arc;

use crate::config::Config;
use crate::documents::DocumentExtractor;
use crate::llm_client::TextGenerator;
use crate::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Hosted text generator. Default: GeminiClient.
    pub generator: Arc<dyn TextGenerator>,
    /// Resume upload parser. Default: PdfExtractor.
    pub documents: Arc<dyn DocumentExtractor>,
    pub sessions: SessionStore,
    pub config: Config,
}

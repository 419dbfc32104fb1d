use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analysis::request::AnalysisMetadata;
use crate::scoring::extractor::ScoreResult;

/// Everything one user's interaction has produced so far.
///
/// Passed explicitly into each analysis operation; lives from session creation until
/// the caller resets it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume_text: Option<String>,
    pub job_description: Option<String>,
    pub metadata: AnalysisMetadata,
    pub analysis: Option<String>,
    pub original_score: Option<ScoreResult>,
    pub current_score: Option<ScoreResult>,
    pub edited_resume: Option<String>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every successful save; a copy is only written back over the revision
    /// it was read at.
    pub revision: u64,
}

impl SessionContext {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            resume_text: None,
            job_description: None,
            metadata: AnalysisMetadata::default(),
            analysis: None,
            original_score: None,
            current_score: None,
            edited_resume: None,
            updated_at: now,
            revision: 0,
        }
    }

    pub fn has_analysis(&self) -> bool {
        self.analysis.is_some()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of writing a session copy back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The session was reset while the copy was being worked on.
    Missing,
    /// Another request saved the session after this copy was read.
    Stale,
}

/// In-memory session contexts keyed by id.
///
/// The lock is only held to copy a context in or out, never across an LLM call.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionContext {
        let session = SessionContext::new();
        self.inner.write().await.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionContext> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Writes back a copy obtained from `get`, replacing the stored state.
    ///
    /// Handlers hold their copy across an LLM call, so two calls on one session may
    /// overlap. Only the first to finish is written; the later one gets `Stale` and its
    /// result is discarded rather than overwriting newer state.
    pub async fn save(&self, mut session: SessionContext) -> SaveOutcome {
        let mut guard = self.inner.write().await;
        match guard.get_mut(&session.id) {
            None => SaveOutcome::Missing,
            Some(slot) if slot.revision != session.revision => SaveOutcome::Stale,
            Some(slot) => {
                session.revision += 1;
                *slot = session;
                SaveOutcome::Saved
            }
        }
    }

    pub async fn remove(&self, id: Uuid) -> Option<SessionContext> {
        self.inner.write().await.remove(&id)
    }
}

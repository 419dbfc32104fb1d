// Resume analysis: request model, prompt templates, and the analyze/rescore service.
// All generator calls go through llm_client::bounded, never call a TextGenerator directly.

pub mod handlers;
pub mod prompts;
pub mod request;
pub mod service;

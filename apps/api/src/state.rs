use std::sync::Arc;

use crate::analysis::terms::TermExtractor;
use crate::augmentation::Augmenter;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Compiled vocabulary matchers, built once at startup.
    pub term_extractor: Arc<TermExtractor>,
    /// Generative backend. `None` disables augmentation and drops
    /// `llm_suggestions` from responses.
    pub augmenter: Option<Arc<dyn Augmenter>>,
}

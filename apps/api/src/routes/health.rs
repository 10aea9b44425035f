use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health, GET /api/health
/// Returns service status, version and the loaded vocabulary version.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ats-api",
        "vocabulary_version": state.term_extractor.vocabulary().version(),
        "augmentation_enabled": state.augmenter.is_some()
    }))
}

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::models::AnalysisResponse;
use crate::analysis::pipeline::{analyze, AnalysisRequest};
use crate::errors::AppError;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";

/// POST /api/analyze
///
/// Multipart form with a `resume` file and a `job_description` text field.
/// The whole request, upload included, runs under `config.request_timeout`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", %request_id);
    let timeout = state.config.request_timeout;

    let work = async {
        let request = read_analysis_form(multipart).await?;
        analyze(&state, request).await
    };

    match tokio::time::timeout(timeout, work.instrument(span.clone())).await {
        Ok(result) => result.map(Json),
        Err(_) => {
            span.in_scope(|| info!("Analysis exceeded {}s", timeout.as_secs()));
            Err(AppError::Timeout)
        }
    }
}

/// Reads the two form fields. Unknown fields are skipped; a missing resume is
/// treated as an empty upload and a missing description as an empty one, so
/// both surface through the usual validation.
async fn read_analysis_form(mut multipart: Multipart) -> Result<AnalysisRequest, AppError> {
    let mut request = AnalysisRequest {
        resume: Bytes::new(),
        content_type: None,
        file_name: None,
        job_description: String::new(),
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            RESUME_FIELD => {
                request.content_type = field.content_type().map(str::to_string);
                request.file_name = field.file_name().map(str::to_string);
                request.resume = field.bytes().await.map_err(multipart_error)?;
            }
            JOB_DESCRIPTION_FIELD => {
                request.job_description = field.text().await.map_err(multipart_error)?;
            }
            _ => {}
        }
    }

    Ok(request)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File too large. Maximum size is 5MB".to_string())
    } else {
        AppError::Validation(err.body_text())
    }
}

pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::extraction::MAX_DOCUMENT_BYTES;
use crate::state::AppState;

/// Room for the job description and multipart framing on top of the largest
/// accepted resume. The resume limit itself is enforced by the pipeline.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        .route("/api/analyze", post(handlers::handle_analyze))
        .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + FORM_OVERHEAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis::terms::TermExtractor;
    use crate::analysis::vocabulary::Vocabulary;
    use crate::augmentation::{
        AugmentationBundle, AugmentationError, AugmentationRequest, Augmenter,
    };
    use crate::config::Config;
    use crate::extraction::docx::tests::build_docx;

    const BOUNDARY: &str = "ats-test-boundary";
    const DOCX_MIME: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
    const JOB: &str =
        "We are hiring a data engineer to build reporting pipelines.\nRequirements: Python, SQL, AWS";

    fn app() -> Router {
        app_with(Config::default(), None)
    }

    fn app_with(config: Config, augmenter: Option<Arc<dyn Augmenter>>) -> Router {
        let vocabulary = Arc::new(Vocabulary::embedded().unwrap());
        build_router(AppState {
            config,
            term_extractor: Arc::new(TermExtractor::new(vocabulary).unwrap()),
            augmenter,
        })
    }

    struct StalledAugmenter;

    #[async_trait]
    impl Augmenter for StalledAugmenter {
        async fn augment(
            &self,
            _request: &AugmentationRequest,
        ) -> Result<AugmentationBundle, AugmentationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(AugmentationBundle::default())
        }
    }

    fn multipart_body(file: Option<(&str, &str, &[u8])>, job: Option<&str>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some((file_name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; \
                     filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(job) = job {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"job_description\"\r\n\r\n{job}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_analyze(body: Vec<u8>) -> (StatusCode, Value) {
        post_analyze_to(app(), body).await
    }

    async fn post_analyze_to(app: Router, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_vocabulary_version() {
        for uri in ["/health", "/api/health"] {
            let response = app()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["status"], "ok");
            assert_eq!(json["service"], "ats-api");
            assert!(json["vocabulary_version"].is_string());
        }
    }

    #[tokio::test]
    async fn test_analyze_returns_full_report() {
        let resume = build_docx(&[
            "Jane Doe",
            "jane@example.com",
            "Experience",
            "Built reporting pipelines in Python for finance teams",
        ]);
        let (status, json) = post_analyze(multipart_body(
            Some(("resume.docx", DOCX_MIME, &resume)),
            Some(JOB),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(
            json["keywords"]["missing"]["technical_skills"],
            serde_json::json!(["SQL", "AWS"])
        );
        assert!(json["score"]["overall_score"].is_u64());
        assert!(json["score"]["category_scores"]["skills_match"].is_u64());
        assert!(json["suggestions"]["summary"]["message"].is_string());
        assert_eq!(json["resume_sections"]["has_experience"], true);
        assert_eq!(json["contact_info"]["email"], "jane@example.com");
        assert!(json.get("llm_suggestions").is_none());
    }

    #[tokio::test]
    async fn test_short_job_description_is_bad_request() {
        let resume = build_docx(&["Jane Doe"]);
        let (status, json) = post_analyze(multipart_body(
            Some(("resume.docx", DOCX_MIME, &resume)),
            Some("Python dev"),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["error"].as_str().unwrap().contains("50"));
    }

    #[tokio::test]
    async fn test_missing_resume_is_bad_request() {
        let (status, json) = post_analyze(multipart_body(None, Some(JOB))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unsupported_format_is_bad_request() {
        let (status, json) = post_analyze(multipart_body(
            Some(("resume.txt", "text/plain", b"Python SQL AWS")),
            Some(JOB),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_unprocessable() {
        let (status, json) = post_analyze(multipart_body(
            Some(("resume.pdf", "application/pdf", b"\x13\x37garbage bytes")),
            Some(JOB),
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "CORRUPT_DOCUMENT");
    }

    #[tokio::test]
    async fn test_oversized_resume_is_payload_too_large() {
        let resume = vec![b'%'; MAX_DOCUMENT_BYTES + 100];
        let (status, json) = post_analyze(multipart_body(
            Some(("resume.pdf", "application/pdf", &resume)),
            Some(JOB),
        ))
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_past_deadline_is_gateway_timeout() {
        let config = Config {
            request_timeout: Duration::from_secs(5),
            augmentation_timeout: Duration::from_secs(600),
            ..Config::default()
        };
        let app = app_with(config, Some(Arc::new(StalledAugmenter)));
        let resume = build_docx(&["Experience", "Built reporting pipelines in Python"]);

        let (status, json) = post_analyze_to(
            app,
            multipart_body(Some(("resume.docx", DOCX_MIME, &resume)), Some(JOB)),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["code"], "TIMEOUT");
    }
}

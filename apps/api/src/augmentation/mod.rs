/// Augmentation Layer: optional generated rewrite suggestions.
///
/// Runs beside scoring and is joined when the response is assembled. Any
/// failure or timeout folds into `Augmentation::Unavailable`; it never fails
/// the request and is never retried.
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::models::CategoryKeywords;
use crate::analysis::vocabulary::KeywordCategory;

pub mod ollama;
pub mod prompts;

pub use ollama::OllamaAugmenter;

const UNAVAILABLE_MESSAGE: &str =
    "AI suggestions are unavailable right now. Keyword analysis and suggestions are unaffected.";

#[derive(Debug, Error)]
pub enum AugmentationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("generation returned empty content")]
    EmptyContent,
}

/// What the generative backend gets to see.
#[derive(Debug, Clone)]
pub struct AugmentationRequest {
    pub resume_text: String,
    pub job_description: String,
    pub missing: CategoryKeywords,
    pub has_projects: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AugmentationBundle {
    pub missing_keywords_list: BTreeMap<KeywordCategory, Vec<String>>,
    pub skills_to_add: Vec<String>,
    pub professional_summary: String,
    pub experience_bullets: Vec<String>,
    pub skills_integration: Vec<String>,
    pub section_specific: BTreeMap<KeywordCategory, Vec<String>>,
    pub project_ideas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unavailable {
    pub llm_unavailable: bool,
    pub message: String,
}

/// The `llm_suggestions` block of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Augmentation {
    Available(AugmentationBundle),
    Unavailable(Unavailable),
}

impl Augmentation {
    pub fn unavailable() -> Self {
        Augmentation::Unavailable(Unavailable {
            llm_unavailable: true,
            message: UNAVAILABLE_MESSAGE.to_string(),
        })
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Augmentation::Available(_))
    }
}

/// A generative backend. Implement this to swap backends without touching
/// the pipeline.
///
/// Carried in `AppState` as `Option<Arc<dyn Augmenter>>`.
#[async_trait]
pub trait Augmenter: Send + Sync {
    async fn augment(
        &self,
        request: &AugmentationRequest,
    ) -> Result<AugmentationBundle, AugmentationError>;
}

/// Runs one augmentation under `timeout`, absorbing every failure.
pub async fn run_augmentation(
    augmenter: Arc<dyn Augmenter>,
    request: AugmentationRequest,
    timeout: Duration,
) -> Augmentation {
    match tokio::time::timeout(timeout, augmenter.augment(&request)).await {
        Ok(Ok(bundle)) => {
            debug!("Augmentation completed");
            Augmentation::Available(bundle)
        }
        Ok(Err(e)) => {
            warn!("Augmentation failed: {e}");
            Augmentation::unavailable()
        }
        Err(_) => {
            warn!("Augmentation timed out after {}s", timeout.as_secs_f32());
            Augmentation::unavailable()
        }
    }
}

/// Missing keywords to add, trimmed per category. Empty categories are left
/// out.
pub fn missing_keywords_list(
    missing: &CategoryKeywords,
) -> BTreeMap<KeywordCategory, Vec<String>> {
    let limits = [
        (KeywordCategory::TechnicalSkills, 10),
        (KeywordCategory::SoftSkills, 5),
        (KeywordCategory::Certifications, 5),
        (KeywordCategory::Education, 3),
    ];
    limits
        .into_iter()
        .filter(|(category, _)| !missing.get(*category).is_empty())
        .map(|(category, limit)| {
            let terms = missing.get(category).iter().take(limit).cloned().collect();
            (category, terms)
        })
        .collect()
}

/// Where each missing keyword belongs in the resume.
pub fn section_specific(missing: &CategoryKeywords) -> BTreeMap<KeywordCategory, Vec<String>> {
    let mut out = BTreeMap::new();

    let tech: Vec<String> = missing
        .technical_skills
        .iter()
        .take(5)
        .map(|skill| format!("Add '{skill}' to your Technical Skills section"))
        .collect();
    if !tech.is_empty() {
        out.insert(KeywordCategory::TechnicalSkills, tech);
    }

    let soft: Vec<String> = missing
        .soft_skills
        .iter()
        .take(3)
        .map(|skill| format!("Demonstrate '{skill}' through specific examples in your experience"))
        .collect();
    if !soft.is_empty() {
        out.insert(KeywordCategory::SoftSkills, soft);
    }

    let certs: Vec<String> = missing
        .certifications
        .iter()
        .take(3)
        .map(|cert| format!("Consider obtaining: {cert}"))
        .collect();
    if !certs.is_empty() {
        out.insert(KeywordCategory::Certifications, certs);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAugmenter;

    #[async_trait]
    impl Augmenter for FixedAugmenter {
        async fn augment(
            &self,
            request: &AugmentationRequest,
        ) -> Result<AugmentationBundle, AugmentationError> {
            Ok(AugmentationBundle {
                missing_keywords_list: missing_keywords_list(&request.missing),
                ..Default::default()
            })
        }
    }

    struct FailingAugmenter;

    #[async_trait]
    impl Augmenter for FailingAugmenter {
        async fn augment(
            &self,
            _request: &AugmentationRequest,
        ) -> Result<AugmentationBundle, AugmentationError> {
            Err(AugmentationError::EmptyContent)
        }
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

    fn request() -> AugmentationRequest {
        AugmentationRequest {
            resume_text: "Python developer".into(),
            job_description: "Python and SQL".into(),
            missing: CategoryKeywords {
                technical_skills: vec!["SQL".into()],
                ..Default::default()
            },
            has_projects: false,
        }
    }

    #[tokio::test]
    async fn test_successful_augmentation() {
        let result =
            run_augmentation(Arc::new(FixedAugmenter), request(), Duration::from_secs(5)).await;
        assert!(result.is_available());
    }

    #[tokio::test]
    async fn test_failure_becomes_unavailable() {
        let result =
            run_augmentation(Arc::new(FailingAugmenter), request(), Duration::from_secs(5)).await;
        assert_eq!(result, Augmentation::unavailable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_unavailable() {
        let result =
            run_augmentation(Arc::new(StalledAugmenter), request(), Duration::from_secs(30)).await;
        assert_eq!(result, Augmentation::unavailable());
    }

    #[test]
    fn test_unavailable_serializes_flag() {
        let json = serde_json::to_value(Augmentation::unavailable()).unwrap();
        assert_eq!(json["llm_unavailable"], true);
        assert!(json["message"].is_string());
    }

    #[test]
    fn test_missing_keywords_list_skips_empty_and_caps() {
        let missing = CategoryKeywords {
            technical_skills: (0..12).map(|i| format!("T{i}")).collect(),
            education: vec!["PhD".into()],
            ..Default::default()
        };
        let list = missing_keywords_list(&missing);
        assert_eq!(list[&KeywordCategory::TechnicalSkills].len(), 10);
        assert_eq!(list[&KeywordCategory::Education], vec!["PhD"]);
        assert!(!list.contains_key(&KeywordCategory::SoftSkills));

        let json = serde_json::to_value(&list).unwrap();
        assert!(json.get("technical_skills").is_some());
    }

    #[test]
    fn test_section_specific() {
        let missing = CategoryKeywords {
            soft_skills: vec!["Leadership".into()],
            certifications: vec!["PMP".into()],
            ..Default::default()
        };
        let sections = section_specific(&missing);
        assert_eq!(
            sections[&KeywordCategory::Certifications],
            vec!["Consider obtaining: PMP"]
        );
        assert!(!sections.contains_key(&KeywordCategory::TechnicalSkills));
    }
}

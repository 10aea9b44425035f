//! Analysis pipeline: validates a request and runs it through extraction,
//! term extraction, matching, scoring, suggestions and augmentation.
//!
//! Resume extraction and job-description term extraction run concurrently on
//! the blocking pool. Matching waits for both. Augmentation starts as soon as
//! the missing keywords are known and runs beside scoring, joined last.

use bytes::Bytes;
use chrono::{Datelike, Utc};
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::analysis::matcher::match_terms;
use crate::analysis::models::{AnalysisResponse, CategoryKeywords, KeywordReport};
use crate::analysis::scorer::{self, ScoringWeights};
use crate::analysis::suggestions;
use crate::augmentation::{run_augmentation, Augmentation, AugmentationRequest};
use crate::errors::AppError;
use crate::extraction::profile::build_profile;
use crate::extraction::{self, Document, ExtractedText, MediaType, MAX_DOCUMENT_BYTES};
use crate::state::AppState;

/// Shortest job description accepted, in characters after trimming.
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;

/// One analysis request as received from the client.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    pub job_description: String,
}

/// Checks everything that can be checked without parsing the file. The job
/// description is validated first so a short one is reported even when the
/// file is also bad.
pub fn validate(request: &AnalysisRequest) -> Result<MediaType, AppError> {
    if request.job_description.trim().chars().count() < MIN_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "Job description must be at least {MIN_JOB_DESCRIPTION_CHARS} characters"
        )));
    }

    if request.resume.is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }

    if request.resume.len() > MAX_DOCUMENT_BYTES {
        return Err(AppError::PayloadTooLarge(
            "File too large. Maximum size is 5MB".to_string(),
        ));
    }

    let media_type = MediaType::resolve(
        request.content_type.as_deref(),
        request.file_name.as_deref(),
    )?;
    Ok(media_type)
}

/// Runs one analysis end to end.
pub async fn analyze(
    state: &AppState,
    request: AnalysisRequest,
) -> Result<AnalysisResponse, AppError> {
    let media_type = validate(&request)?;
    let document = Document::new(request.resume, media_type);
    let job_description = request.job_description;
    let reference_year = Utc::now().year();

    info!(
        "Analyzing {} resume ({} bytes) against a {}-character job description",
        media_type.label(),
        document.size(),
        job_description.chars().count()
    );

    let extractor = state.term_extractor.clone();
    let resume_task = tokio::task::spawn_blocking(move || {
        let text = extraction::extract(&document)?;
        let terms = extractor.extract_resume(&text, reference_year);
        let profile = build_profile(&text);
        Ok::<_, extraction::ExtractionError>((text, terms, profile))
    });

    let extractor = state.term_extractor.clone();
    let job_text = job_description.clone();
    let job_task = tokio::task::spawn_blocking(move || {
        let text = ExtractedText::from_raw(&job_text);
        extractor.extract_job_description(&text)
    });

    let (resume_joined, job_joined) = tokio::join!(resume_task, job_task);
    let (resume_text, mut resume_terms, profile) = resume_joined.map_err(task_failed)??;
    let job_terms = job_joined.map_err(task_failed)?;

    state
        .term_extractor
        .add_listed_terms(&resume_text, &mut resume_terms, &job_terms);
    let matches = match_terms(&job_terms, &resume_terms);
    let missing = CategoryKeywords::missing(&matches);

    let augmentation = state.augmenter.clone().map(|augmenter| {
        let request = AugmentationRequest {
            resume_text: resume_text.text().to_string(),
            job_description: job_description.clone(),
            missing: missing.clone(),
            has_projects: profile.sections.has_projects,
        };
        tokio::spawn(run_augmentation(
            augmenter,
            request,
            state.config.augmentation_timeout,
        ))
    });

    let score = scorer::score(&matches, &ScoringWeights::default());
    let suggestions = suggestions::generate(&matches, &score, &profile);

    let llm_suggestions = match augmentation {
        Some(handle) => Some(handle.await.unwrap_or_else(|e| {
            warn!("Augmentation task failed: {e}");
            Augmentation::unavailable()
        })),
        None => None,
    };

    info!(
        "Analysis complete: score={} rating={:?} missing={} augmented={}",
        score.overall_score,
        score.rating,
        matches.total_missing(),
        llm_suggestions.as_ref().is_some_and(Augmentation::is_available)
    );

    Ok(AnalysisResponse {
        success: true,
        score,
        keywords: KeywordReport {
            found: CategoryKeywords::found(&job_terms.keywords),
            matched: CategoryKeywords::matched(&matches),
            missing,
            density: score.category_scores.keyword_density,
        },
        suggestions,
        llm_suggestions,
        resume_sections: profile.sections,
        contact_info: profile.contact_info,
        vocabulary_version: state.term_extractor.vocabulary().version().to_string(),
    })
}

fn task_failed(err: JoinError) -> AppError {
    AppError::Internal(anyhow::anyhow!("analysis task failed: {err}"))
}

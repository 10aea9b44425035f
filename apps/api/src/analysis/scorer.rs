//! Scorer: weighted category scores, overall score and rating band.
//!
//! Pure and deterministic: the same `MatchResult` always yields the same
//! `OverallScore`.

use serde::{Deserialize, Serialize};

use crate::analysis::matcher::{CategoryMatch, MatchResult};
use crate::analysis::vocabulary::KeywordCategory;

/// Category weights in whole percent. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills_match: u32,
    pub experience_match: u32,
    pub education_match: u32,
    pub keyword_density: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills_match: 40,
            experience_match: 30,
            education_match: 15,
            keyword_density: 15,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> u32 {
        self.skills_match + self.experience_match + self.education_match + self.keyword_density
    }
}

/// Share of the experience score taken by term evidence when the job
/// description also states required years.
const TERM_EVIDENCE_SHARE: f64 = 0.75;
/// Mentions beyond this many in the job description do not raise the density
/// target.
const DENSITY_TARGET_CAP: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

/// Lower bound of each rating band, highest first. Covers 0..=100.
pub const RATING_BANDS: &[(u32, Rating)] = &[
    (80, Rating::Excellent),
    (60, Rating::Good),
    (40, Rating::Fair),
    (0, Rating::NeedsImprovement),
];

pub fn rating_for(score: u32) -> Rating {
    RATING_BANDS
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, rating)| *rating)
        .unwrap_or(Rating::NeedsImprovement)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryScores {
    pub skills_match: u32,
    pub experience_match: u32,
    pub education_match: u32,
    pub keyword_density: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverallScore {
    pub overall_score: u32,
    pub rating: Rating,
    pub category_scores: CategoryScores,
}

/// Scores a match result. Every category whose denominator is empty scores
/// exactly 100.
pub fn score(result: &MatchResult, weights: &ScoringWeights) -> OverallScore {
    let category_scores = CategoryScores {
        skills_match: to_percent(coverage(&[
            result.category(KeywordCategory::TechnicalSkills),
            result.category(KeywordCategory::SoftSkills),
        ])),
        experience_match: to_percent(experience(result)),
        education_match: to_percent(coverage(&[
            result.category(KeywordCategory::Education),
            result.category(KeywordCategory::Certifications),
        ])),
        keyword_density: to_percent(density(result)),
    };

    let weighted = weights.skills_match * category_scores.skills_match
        + weights.experience_match * category_scores.experience_match
        + weights.education_match * category_scores.education_match
        + weights.keyword_density * category_scores.keyword_density;
    let total = weights.total().max(1);
    let overall_score = ((weighted + total / 2) / total).min(100);

    OverallScore {
        overall_score,
        rating: rating_for(overall_score),
        category_scores,
    }
}

/// Matched share of the pooled categories, 0.0..=1.0.
fn coverage(categories: &[&CategoryMatch]) -> f64 {
    let total: usize = categories.iter().map(|c| c.total()).sum();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = categories.iter().map(|c| c.matched.len()).sum();
    matched as f64 / total as f64
}

/// Skill and soft-skill terms the resume backs with experience, blended with
/// how much of the required years the resume covers.
fn experience(result: &MatchResult) -> f64 {
    let pooled = [
        result.category(KeywordCategory::TechnicalSkills),
        result.category(KeywordCategory::SoftSkills),
    ];
    let total: usize = pooled.iter().map(|c| c.total()).sum();
    let evidence = if total == 0 {
        1.0
    } else {
        let demonstrated = pooled
            .iter()
            .flat_map(|c| c.matched.iter())
            .filter(|t| t.demonstrated)
            .count();
        demonstrated as f64 / total as f64
    };

    match result.experience.satisfaction() {
        Some(years) => TERM_EVIDENCE_SHARE * evidence + (1.0 - TERM_EVIDENCE_SHARE) * years,
        None => evidence,
    }
}

/// Mean per-term ratio of resume mentions to job-description mentions, with
/// the target capped so one heavily repeated term cannot dominate.
fn density(result: &MatchResult) -> f64 {
    let mut ratios = Vec::new();
    for category in KeywordCategory::ALL {
        let split = result.category(category);
        for term in &split.matched {
            let target = term.job_occurrences.clamp(1, DENSITY_TARGET_CAP);
            ratios.push(term.resume_occurrences.min(target) as f64 / target as f64);
        }
        ratios.extend(split.missing.iter().map(|_| 0.0));
    }

    if ratios.is_empty() {
        return 1.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

fn to_percent(ratio: f64) -> u32 {
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u32
}

use serde::Serialize;

use crate::analysis::matcher::MatchResult;
use crate::analysis::scorer::OverallScore;
use crate::analysis::suggestions::SuggestionReport;
use crate::analysis::terms::KeywordSet;
use crate::analysis::vocabulary::KeywordCategory;
use crate::augmentation::Augmentation;
use crate::extraction::profile::{ContactInfo, ResumeSections};

/// One list of display names per keyword category. Every category is always
/// present, empty or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryKeywords {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub certifications: Vec<String>,
    pub education: Vec<String>,
}

impl CategoryKeywords {
    pub fn from_fn(mut f: impl FnMut(KeywordCategory) -> Vec<String>) -> Self {
        Self {
            technical_skills: f(KeywordCategory::TechnicalSkills),
            soft_skills: f(KeywordCategory::SoftSkills),
            certifications: f(KeywordCategory::Certifications),
            education: f(KeywordCategory::Education),
        }
    }

    pub fn found(keywords: &KeywordSet) -> Self {
        Self::from_fn(|c| keywords.displays(c))
    }

    pub fn matched(result: &MatchResult) -> Self {
        Self::from_fn(|c| result.matched_displays(c))
    }

    pub fn missing(result: &MatchResult) -> Self {
        Self::from_fn(|c| result.missing_displays(c))
    }

    pub fn get(&self, category: KeywordCategory) -> &[String] {
        match category {
            KeywordCategory::TechnicalSkills => &self.technical_skills,
            KeywordCategory::SoftSkills => &self.soft_skills,
            KeywordCategory::Certifications => &self.certifications,
            KeywordCategory::Education => &self.education,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordReport {
    /// Terms found in the job description.
    pub found: CategoryKeywords,
    pub matched: CategoryKeywords,
    pub missing: CategoryKeywords,
    pub density: u32,
}

/// Body of a successful `POST /api/analyze`. Built per request, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub score: OverallScore,
    pub keywords: KeywordReport,
    pub suggestions: SuggestionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_suggestions: Option<Augmentation>,
    pub resume_sections: ResumeSections,
    pub contact_info: ContactInfo,
    pub vocabulary_version: String,
}

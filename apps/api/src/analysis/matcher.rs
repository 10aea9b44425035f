//! Keyword Matcher: splits the job description's terms into matched and
//! missing per category.
//!
//! For every category, `matched ∪ missing` is exactly the job description's
//! term set and the two never overlap. Both lists keep job-description order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::terms::{DocumentTerms, Term};
use crate::analysis::vocabulary::KeywordCategory;
use crate::extraction::SectionKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedTerm {
    pub canonical: String,
    pub display: String,
    pub job_occurrences: u32,
    pub resume_occurrences: u32,
    /// The resume backs the term with experience rather than only listing it.
    pub demonstrated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingTerm {
    pub canonical: String,
    pub display: String,
    pub job_occurrences: u32,
    /// Named in a requirements or skills list of the job description.
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMatch {
    pub matched: Vec<MatchedTerm>,
    pub missing: Vec<MissingTerm>,
}

impl CategoryMatch {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExperienceComparison {
    pub required_years: Option<u32>,
    pub resume_years: Option<u32>,
}

impl ExperienceComparison {
    /// Share of the required years the resume covers, `None` when the job
    /// description asks for none.
    pub fn satisfaction(&self) -> Option<f64> {
        let required = self.required_years.filter(|y| *y > 0)?;
        let claimed = self.resume_years.unwrap_or(0);
        Some((claimed as f64 / required as f64).min(1.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    categories: BTreeMap<KeywordCategory, CategoryMatch>,
    pub experience: ExperienceComparison,
}

impl MatchResult {
    pub fn category(&self, category: KeywordCategory) -> &CategoryMatch {
        static EMPTY: CategoryMatch = CategoryMatch {
            matched: Vec::new(),
            missing: Vec::new(),
        };
        self.categories.get(&category).unwrap_or(&EMPTY)
    }

    pub fn total_missing(&self) -> usize {
        self.categories.values().map(|c| c.missing.len()).sum()
    }

    pub fn matched_displays(&self, category: KeywordCategory) -> Vec<String> {
        self.category(category)
            .matched
            .iter()
            .map(|t| t.display.clone())
            .collect()
    }

    pub fn missing_displays(&self, category: KeywordCategory) -> Vec<String> {
        self.category(category)
            .missing
            .iter()
            .map(|t| t.display.clone())
            .collect()
    }
}

/// Partitions the job description's terms against the resume's.
pub fn match_terms(job: &DocumentTerms, resume: &DocumentTerms) -> MatchResult {
    let mut categories = BTreeMap::new();

    for category in KeywordCategory::ALL {
        let mut result = CategoryMatch::default();

        for job_term in job.keywords.get(category) {
            match resume.keywords.find(category, &job_term.canonical) {
                Some(resume_term) => result.matched.push(MatchedTerm {
                    canonical: job_term.canonical.clone(),
                    display: job_term.display.clone(),
                    job_occurrences: job_term.occurrences,
                    resume_occurrences: resume_term.occurrences,
                    demonstrated: is_demonstrated(job_term, resume_term, resume),
                }),
                None => result.missing.push(MissingTerm {
                    canonical: job_term.canonical.clone(),
                    display: job_term.display.clone(),
                    job_occurrences: job_term.occurrences,
                    required: job_term.seen_in(SectionKind::Requirements)
                        || job_term.seen_in(SectionKind::Skills),
                }),
            }
        }

        categories.insert(category, result);
    }

    MatchResult {
        categories,
        experience: ExperienceComparison {
            required_years: job.experience_years,
            resume_years: resume.experience_years,
        },
    }
}

/// A term counts as experience when the resume uses it in an experience or
/// project section, when the resume has no experience section to check, or
/// when the resume uses it in every context the job description does.
fn is_demonstrated(job_term: &Term, resume_term: &Term, resume: &DocumentTerms) -> bool {
    !resume.has_experience_section
        || resume_term.seen_in(SectionKind::Experience)
        || resume_term.seen_in(SectionKind::Projects)
        || job_term.contexts.is_subset(&resume_term.contexts)
}

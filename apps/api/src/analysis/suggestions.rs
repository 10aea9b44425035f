//! Suggestion Generator: turns missing keywords and weak sub-scores into
//! deduplicated suggestions grouped by severity, plus a summary.

use std::collections::HashSet;

use serde::Serialize;

use crate::analysis::matcher::{MatchResult, MissingTerm};
use crate::analysis::scorer::OverallScore;
use crate::analysis::vocabulary::KeywordCategory;
use crate::extraction::profile::ResumeProfile;

/// Recommended items shown per response; the summary reports the full count.
pub const MAX_RECOMMENDED: usize = 5;
const MAX_TOP_ACTIONS: usize = 3;
/// Job-description mentions that make a missing skill critical on their own.
const CRITICAL_MENTIONS: u32 = 2;

const LOW_OVERALL_SCORE: u32 = 40;
const LOW_EXPERIENCE_SCORE: u32 = 60;
const LOW_DENSITY_SCORE: u32 = 50;
const WEAK_SKILLS_SCORE: u32 = 70;

/// Project ideas per family of missing technical skills (canonical forms).
const PROJECT_FAMILIES: &[(&str, &[&str])] = &[
    (
        "a full-stack web application",
        &[
            "react", "angular", "vue", "javascript", "typescript", "node.js", "express.js",
            "django", "flask", "html", "css", "graphql", "rest api",
        ],
    ),
    (
        "a data analysis or ML project",
        &[
            "python", "machine learning", "deep learning", "data analysis", "pandas", "numpy",
            "tensorflow", "pytorch", "scikit-learn", "nlp", "computer vision",
        ],
    ),
    (
        "a mobile app",
        &["android", "ios", "react native", "flutter", "swift", "kotlin"],
    ),
    (
        "a cloud-deployed application",
        &["aws", "azure", "gcp", "docker", "kubernetes", "ci/cd", "terraform"],
    ),
    (
        "a database-driven application",
        &["sql", "mongodb", "postgresql", "mysql", "redis", "elasticsearch"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Important,
    Recommended,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub action: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<&'static str>,
}

impl Suggestion {
    fn new(
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            action: action.into(),
            severity,
            keywords: Vec::new(),
            section: None,
        }
    }

    fn in_section(mut self, section: &'static str) -> Self {
        self.section = Some(section);
        self
    }

    fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionSummary {
    pub message: String,
    pub priority: Priority,
    pub total_missing_keywords: usize,
    pub critical_issues: usize,
    pub important_issues: usize,
    pub total_recommendations: usize,
    pub top_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionReport {
    pub critical: Vec<Suggestion>,
    pub important: Vec<Suggestion>,
    pub recommended: Vec<Suggestion>,
    pub summary: SuggestionSummary,
}

/// Collects suggestions into tiers, dropping repeated titles.
#[derive(Default)]
struct Tiers {
    seen: HashSet<String>,
    critical: Vec<Suggestion>,
    important: Vec<Suggestion>,
    recommended: Vec<Suggestion>,
}

impl Tiers {
    fn push(&mut self, suggestion: Suggestion) {
        if !self.seen.insert(suggestion.title.to_lowercase()) {
            return;
        }
        match suggestion.severity {
            Severity::Critical => self.critical.push(suggestion),
            Severity::Important => self.important.push(suggestion),
            Severity::Recommended => self.recommended.push(suggestion),
        }
    }
}

/// Generates the suggestion report. Deterministic for identical inputs.
pub fn generate(
    result: &MatchResult,
    score: &OverallScore,
    profile: &ResumeProfile,
) -> SuggestionReport {
    let scores = &score.category_scores;
    let mut tiers = Tiers::default();

    if score.overall_score < LOW_OVERALL_SCORE {
        tiers.push(Suggestion::new(
            Severity::Critical,
            "Low ATS Score - Major Improvements Needed",
            "Your resume needs significant optimization to pass ATS screening.",
            "Focus on adding the missing keywords and restructuring content to match the job requirements.",
        ));
    }

    for category in KeywordCategory::ALL {
        for term in &result.category(category).missing {
            tiers.push(missing_term_suggestion(category, term));
        }
    }

    if scores.experience_match < LOW_EXPERIENCE_SCORE {
        let description = match (result.experience.required_years, result.experience.resume_years) {
            (Some(required), claimed) if claimed.unwrap_or(0) < required => format!(
                "The role asks for {required}+ years and your experience section doesn't make that clear."
            ),
            _ => "Your experience section doesn't show the skills the job asks for.".to_string(),
        };
        tiers.push(
            Suggestion::new(
                Severity::Important,
                "Strengthen Experience Section",
                description,
                "Rewrite bullet points around the job's key skills and quantify the results.",
            )
            .in_section("experience"),
        );
    }

    if scores.keyword_density < LOW_DENSITY_SCORE {
        tiers.push(
            Suggestion::new(
                Severity::Important,
                "Increase Keyword Density",
                "Your resume mentions the job's keywords less often than the posting does.",
                "Naturally repeat the job-specific terms where you describe related work.",
            )
            .in_section("all"),
        );
    }

    for suggestion in recommendations(result, score, profile) {
        tiers.push(suggestion);
    }

    let total_recommendations = tiers.recommended.len();
    tiers.recommended.truncate(MAX_RECOMMENDED);

    let top_actions = tiers
        .critical
        .iter()
        .chain(&tiers.important)
        .chain(&tiers.recommended)
        .take(MAX_TOP_ACTIONS)
        .map(|s| s.action.clone())
        .collect();

    let (message, priority) = summary_message(score.overall_score);
    let summary = SuggestionSummary {
        message: message.to_string(),
        priority,
        total_missing_keywords: result.total_missing(),
        critical_issues: tiers.critical.len(),
        important_issues: tiers.important.len(),
        total_recommendations,
        top_actions,
    };

    SuggestionReport {
        critical: tiers.critical,
        important: tiers.important,
        recommended: tiers.recommended,
        summary,
    }
}

fn missing_term_suggestion(category: KeywordCategory, term: &MissingTerm) -> Suggestion {
    let name = &term.display;
    let mentions = match term.job_occurrences {
        1 => "once".to_string(),
        n => format!("{n} times"),
    };
    let pressing = term.job_occurrences >= CRITICAL_MENTIONS || term.required;

    let suggestion = match category {
        KeywordCategory::TechnicalSkills => Suggestion::new(
            if pressing { Severity::Critical } else { Severity::Important },
            format!("Add {name}"),
            format!("The job description mentions {name} {mentions} but your resume does not."),
            format!("Add {name} to your Skills section and show where you used it in your experience."),
        )
        .in_section("skills"),
        KeywordCategory::Certifications => Suggestion::new(
            if pressing { Severity::Critical } else { Severity::Important },
            format!("List {name}"),
            format!("The job asks for {name}, which your resume doesn't mention."),
            format!("If you hold {name}, list it in a Certifications section; otherwise consider pursuing it."),
        )
        .in_section("certifications"),
        KeywordCategory::SoftSkills => Suggestion::new(
            Severity::Important,
            format!("Demonstrate {name}"),
            format!("The job values {name}, but your resume never mentions it."),
            format!("Describe a specific result in your experience that shows {name}."),
        )
        .in_section("experience"),
        KeywordCategory::Education => Suggestion::new(
            Severity::Important,
            format!("Highlight {name}"),
            format!("The job lists {name} and your resume doesn't show it."),
            format!("Make sure {name} is stated clearly in your Education section."),
        )
        .in_section("education"),
    };

    suggestion.with_keywords(vec![name.clone()])
}

/// General advice not tied to one missing keyword, in display order.
fn recommendations(
    result: &MatchResult,
    score: &OverallScore,
    profile: &ResumeProfile,
) -> Vec<Suggestion> {
    let mut out = Vec::new();
    let sections = &profile.sections;
    let tech_missing = result.category(KeywordCategory::TechnicalSkills).missing.as_slice();

    if !sections.has_projects || score.category_scores.skills_match < WEAK_SKILLS_SCORE {
        if tech_missing.is_empty() {
            out.push(
                Suggestion::new(
                    Severity::Recommended,
                    "Strengthen Projects Section",
                    "Projects show practical use of your skills.",
                    "Add 2-3 projects that match the job requirements, naming the technologies used and the outcome.",
                )
                .in_section("projects"),
            );
        } else {
            let showcased: Vec<&str> = tech_missing.iter().take(3).map(|t| t.display.as_str()).collect();
            out.push(
                Suggestion::new(
                    Severity::Recommended,
                    "Add Relevant Projects",
                    format!("Projects showcasing {} would strengthen your resume.", showcased.join(", ")),
                    format!("Consider building {}.", project_ideas(tech_missing)),
                )
                .in_section("projects")
                .with_keywords(tech_missing.iter().map(|t| t.display.clone()).collect()),
            );
        }
    }

    for (present, name, section) in [
        (sections.has_experience, "Experience", "experience"),
        (sections.has_education, "Education", "education"),
        (sections.has_skills, "Skills", "skills"),
    ] {
        if !present {
            out.push(
                Suggestion::new(
                    Severity::Recommended,
                    format!("Add {name} Section"),
                    format!("Your resume doesn't have a clear {section} section."),
                    format!("Create a dedicated {name} section with a standard header."),
                )
                .in_section(section),
            );
        }
    }

    if profile.statement_lines > 0 && profile.quantified_lines * 2 < profile.statement_lines {
        out.push(
            Suggestion::new(
                Severity::Recommended,
                "Quantify Your Achievements",
                format!(
                    "Only {} of {} experience bullets include a number, percentage or amount.",
                    profile.quantified_lines, profile.statement_lines
                ),
                "Add metrics such as team size, revenue, latency or percentage improvements to your bullets.",
            )
            .in_section("experience"),
        );
    }

    if !profile.contact_info.is_reachable() {
        out.push(Suggestion::new(
            Severity::Recommended,
            "Include Contact Information",
            "No email address or phone number was found in your resume.",
            "Put your phone, email and LinkedIn at the top of your resume.",
        ));
    }

    out.push(Suggestion::new(
        Severity::Recommended,
        "Use Standard Section Headers",
        "ATS systems look for standard section names.",
        "Use headers like \"Work Experience\", \"Education\", \"Skills\" and \"Certifications\".",
    ));
    out.push(Suggestion::new(
        Severity::Recommended,
        "Avoid Graphics and Tables",
        "Complex formatting can confuse ATS parsers.",
        "Use simple bullet points and plain text formatting.",
    ));

    out
}

fn project_ideas(tech_missing: &[MissingTerm]) -> String {
    let ideas: Vec<&str> = PROJECT_FAMILIES
        .iter()
        .filter(|(_, skills)| tech_missing.iter().any(|t| skills.contains(&t.canonical.as_str())))
        .map(|(idea, _)| *idea)
        .take(2)
        .collect();

    if ideas.is_empty() {
        "projects demonstrating the required technologies".to_string()
    } else {
        ideas.join(" or ")
    }
}

fn summary_message(overall_score: u32) -> (&'static str, Priority) {
    if overall_score >= 80 {
        (
            "Your resume is well-optimized for ATS! Just a few minor tweaks recommended.",
            Priority::Low,
        )
    } else if overall_score >= 60 {
        (
            "Your resume is good but has room for improvement. Focus on the important suggestions.",
            Priority::Medium,
        )
    } else {
        (
            "Your resume needs significant optimization to pass ATS screening. Address critical issues first.",
            Priority::High,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::analysis::matcher::match_terms;
    use crate::analysis::scorer::{score, ScoringWeights};
    use crate::analysis::terms::TermExtractor;
    use crate::analysis::vocabulary::Vocabulary;
    use crate::extraction::profile::build_profile;
    use crate::extraction::ExtractedText;

    fn report_for(job: &str, resume: &str) -> SuggestionReport {
        let extractor = TermExtractor::new(Arc::new(Vocabulary::embedded().unwrap())).unwrap();
        let job_terms = extractor.extract_job_description(&ExtractedText::from_raw(job));
        let resume_text = ExtractedText::from_raw(resume);
        let mut resume_terms = extractor.extract_resume(&resume_text, 2024);
        extractor.add_listed_terms(&resume_text, &mut resume_terms, &job_terms);
        let result = match_terms(&job_terms, &resume_terms);
        let scored = score(&result, &ScoringWeights::default());
        generate(&result, &scored, &build_profile(&resume_text))
    }

    const RESUME: &str = "Jane Doe\njane@example.com\nExperience\nBuilt Python services handling 2M requests per day\nSkills\nPython, communication\nEducation\nBSc Computer Science";

    #[test]
    fn test_repeated_missing_skill_is_critical() {
        let report = report_for(
            "Python and Kafka engineer. Kafka streaming at scale, Kafka Connect. Docker a plus.",
            RESUME,
        );
        let critical: Vec<&str> = report.critical.iter().map(|s| s.title.as_str()).collect();
        let important: Vec<&str> = report.important.iter().map(|s| s.title.as_str()).collect();
        assert!(critical.contains(&"Add Kafka"));
        assert!(important.contains(&"Add Docker"));
    }

    #[test]
    fn test_required_skill_is_critical() {
        let report = report_for("About the team\nWe build tools.\nRequirements: Terraform", RESUME);
        assert!(report.critical.iter().any(|s| s.title == "Add Terraform"));
    }

    #[test]
    fn test_soft_and_education_gaps_are_important() {
        let report = report_for("Python role needing leadership and a PhD.", RESUME);
        let important: Vec<&str> = report.important.iter().map(|s| s.title.as_str()).collect();
        assert!(important.contains(&"Demonstrate Leadership"));
        assert!(important.contains(&"Highlight PhD"));
        assert!(!report.critical.iter().any(|s| s.title.contains("Leadership")));
    }

    #[test]
    fn test_identical_documents_have_no_critical_or_important() {
        let text = "Requirements\nPython, SQL, Docker, 3+ years, leadership, Bachelor's degree";
        let report = report_for(text, text);
        assert!(report.critical.is_empty());
        assert!(report.important.is_empty());
        assert_eq!(report.summary.priority, Priority::Low);
        assert_eq!(report.summary.total_missing_keywords, 0);
    }

    #[test]
    fn test_recommended_is_capped() {
        let report = report_for("Python, SQL, AWS", "Plain text resume with no headers at all here");
        assert!(report.recommended.len() <= MAX_RECOMMENDED);
        assert!(report.summary.total_recommendations > MAX_RECOMMENDED);
    }

    #[test]
    fn test_low_score_summary_and_top_actions() {
        let report = report_for("Python, SQL, AWS, Kubernetes, leadership, PMP", "Graphic designer");
        assert_eq!(report.critical[0].title, "Low ATS Score - Major Improvements Needed");
        assert_eq!(report.summary.priority, Priority::High);
        assert_eq!(report.summary.critical_issues, report.critical.len());
        assert_eq!(report.summary.top_actions.len(), MAX_TOP_ACTIONS);
        assert_eq!(report.summary.top_actions[0], report.critical[0].action);
        assert_eq!(report.summary.total_missing_keywords, 6);
    }

    #[test]
    fn test_titles_are_unique() {
        let report = report_for("Python, SQL, AWS, Docker, leadership", "Nothing here");
        let mut titles: Vec<&str> = report
            .critical
            .iter()
            .chain(&report.important)
            .chain(&report.recommended)
            .map(|s| s.title.as_str())
            .collect();
        let before = titles.len();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(before, titles.len());
    }

    #[test]
    fn test_deterministic_output() {
        let job = "Python, SQL, AWS, Docker, leadership, teamwork, PMP, PhD";
        assert_eq!(report_for(job, RESUME), report_for(job, RESUME));
    }

    #[test]
    fn test_project_ideas_by_family() {
        let missing = |canonical: &str| MissingTerm {
            canonical: canonical.to_string(),
            display: canonical.to_string(),
            job_occurrences: 1,
            required: false,
        };
        assert_eq!(
            project_ideas(&[missing("react"), missing("docker")]),
            "a full-stack web application or a cloud-deployed application"
        );
        assert_eq!(
            project_ideas(&[missing("cobol")]),
            "projects demonstrating the required technologies"
        );
    }

    #[test]
    fn test_severity_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Severity::Recommended).unwrap(), r#""recommended""#);
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), r#""medium""#);
    }
}

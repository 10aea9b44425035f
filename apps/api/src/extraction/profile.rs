//! Resume profile: contact details, section presence and how well experience
//! lines are quantified.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::text::{ExtractedText, SectionKind};

/// Experience lines shorter than this are titles or dates, not achievements.
const MIN_STATEMENT_WORDS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

impl ContactInfo {
    pub fn is_reachable(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeSections {
    pub has_summary: bool,
    pub has_experience: bool,
    pub has_education: bool,
    pub has_skills: bool,
    pub has_certifications: bool,
    pub has_projects: bool,
    pub word_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeProfile {
    pub sections: ResumeSections,
    pub contact_info: ContactInfo,
    /// Achievement-style lines in the experience section.
    pub statement_lines: usize,
    /// Of those, lines carrying a number, percentage or currency amount.
    pub quantified_lines: usize,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .expect("email pattern is valid")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b")
            .expect("phone pattern is valid")
    })
}

fn linkedin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)linkedin\.com/in/[\w-]+").expect("linkedin pattern is valid")
    })
}

/// Builds the profile of an extracted resume.
pub fn build_profile(resume: &ExtractedText) -> ResumeProfile {
    let text = resume.text();

    let sections = ResumeSections {
        has_summary: resume.has_section(SectionKind::Summary),
        has_experience: resume.has_section(SectionKind::Experience),
        has_education: resume.has_section(SectionKind::Education),
        has_skills: resume.has_section(SectionKind::Skills),
        has_certifications: resume.has_section(SectionKind::Certifications),
        has_projects: resume.has_section(SectionKind::Projects),
        word_count: resume.word_count(),
    };

    let contact_info = ContactInfo {
        email: email_regex().find(text).map(|m| m.as_str().to_string()),
        phone: phone_regex().find(text).map(|m| m.as_str().trim().to_string()),
        linkedin: linkedin_regex().find(text).map(|m| m.as_str().to_string()),
    };

    let experience = if sections.has_experience {
        resume.section_text(SectionKind::Experience)
    } else {
        text.to_string()
    };

    let statements: Vec<&str> = experience
        .lines()
        .filter(|line| line.split_whitespace().count() >= MIN_STATEMENT_WORDS)
        .collect();
    let quantified_lines = statements.iter().filter(|l| is_quantified(l)).count();

    ResumeProfile {
        sections,
        contact_info,
        statement_lines: statements.len(),
        quantified_lines,
    }
}

/// A line is quantified when it states a number, percentage or amount.
pub fn is_quantified(line: &str) -> bool {
    line.chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '%' | '$' | '€' | '£'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\njane.doe@example.com | (555) 123-4567 | linkedin.com/in/jane-doe\nSummary\nBackend engineer focused on payments.\nExperience\nAcme Corp\nReduced API latency by 40% across the checkout flow\nWorked on the internal billing service with the team\nSkills\nRust, Python";

    #[test]
    fn test_contact_info_detected() {
        let profile = build_profile(&ExtractedText::from_raw(RESUME));
        assert_eq!(
            profile.contact_info.email.as_deref(),
            Some("jane.doe@example.com")
        );
        assert_eq!(profile.contact_info.phone.as_deref(), Some("(555) 123-4567"));
        assert_eq!(
            profile.contact_info.linkedin.as_deref(),
            Some("linkedin.com/in/jane-doe")
        );
        assert!(profile.contact_info.is_reachable());
    }

    #[test]
    fn test_section_presence() {
        let profile = build_profile(&ExtractedText::from_raw(RESUME));
        assert!(profile.sections.has_summary);
        assert!(profile.sections.has_experience);
        assert!(profile.sections.has_skills);
        assert!(!profile.sections.has_education);
        assert!(!profile.sections.has_projects);
    }

    #[test]
    fn test_quantified_lines_counted_in_experience() {
        let profile = build_profile(&ExtractedText::from_raw(RESUME));
        assert_eq!(profile.statement_lines, 2);
        assert_eq!(profile.quantified_lines, 1);
    }

    #[test]
    fn test_is_quantified() {
        assert!(is_quantified("Saved $2M per year"));
        assert!(is_quantified("Cut build time 3x"));
        assert!(!is_quantified("Helped the team ship features"));
    }
}

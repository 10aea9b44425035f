//! Controlled vocabulary: a versioned, read-only table of canonical terms and
//! their aliases per keyword category.
//!
//! Loaded once at startup and shared by reference; nothing mutates it after
//! construction.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vocabulary shipped with the binary. `VOCABULARY_PATH` overrides it.
const EMBEDDED_VOCABULARY: &str = include_str!("../../config/vocabulary.toml");

/// Closed set of keyword buckets. Declaration order is the ordering used
/// everywhere in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    TechnicalSkills,
    SoftSkills,
    Certifications,
    Education,
}

impl KeywordCategory {
    pub const ALL: [KeywordCategory; 4] = [
        KeywordCategory::TechnicalSkills,
        KeywordCategory::SoftSkills,
        KeywordCategory::Certifications,
        KeywordCategory::Education,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            KeywordCategory::TechnicalSkills => "technical skills",
            KeywordCategory::SoftSkills => "soft skills",
            KeywordCategory::Certifications => "certifications",
            KeywordCategory::Education => "education",
        }
    }
}

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse vocabulary: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Vocabulary term '{term}' is defined by both '{first}' and '{second}'")]
    Duplicate {
        term: String,
        first: String,
        second: String,
    },

    #[error("Invalid vocabulary: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    version: String,
    #[serde(default)]
    technical_skills: Vec<TermSpec>,
    #[serde(default)]
    soft_skills: Vec<TermSpec>,
    #[serde(default)]
    certifications: Vec<TermSpec>,
    #[serde(default)]
    education: Vec<TermSpec>,
}

#[derive(Debug, Deserialize)]
struct TermSpec {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
}

/// One canonical term. `patterns` holds the canonical form followed by every
/// alias, all canonicalized.
#[derive(Debug, Clone)]
pub struct VocabularyEntry {
    pub category: KeywordCategory,
    pub display: String,
    pub canonical: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    version: String,
    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    pub fn embedded() -> Result<Self, VocabularyError> {
        Self::from_toml_str(EMBEDDED_VOCABULARY)
    }

    pub fn from_path(path: &Path) -> Result<Self, VocabularyError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Loads the override file when given, the embedded table otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, VocabularyError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, VocabularyError> {
        let file: VocabularyFile = toml::from_str(raw)?;

        let version = file.version.trim().to_string();
        if version.is_empty() {
            return Err(VocabularyError::Invalid("version must not be empty".into()));
        }

        let groups = [
            (KeywordCategory::TechnicalSkills, file.technical_skills),
            (KeywordCategory::SoftSkills, file.soft_skills),
            (KeywordCategory::Certifications, file.certifications),
            (KeywordCategory::Education, file.education),
        ];

        let mut owners: HashMap<String, String> = HashMap::new();
        let mut entries = Vec::new();

        for (category, specs) in groups {
            for spec in specs {
                let display = spec.name.trim().to_string();
                let canonical = canonicalize(&display);
                if canonical.is_empty() {
                    return Err(VocabularyError::Invalid(format!(
                        "empty term name in {}",
                        category.label()
                    )));
                }

                let mut patterns: Vec<String> = Vec::with_capacity(spec.aliases.len() + 1);
                for pattern in std::iter::once(canonical.clone())
                    .chain(spec.aliases.iter().map(|a| canonicalize(a)))
                {
                    if pattern.is_empty() || patterns.contains(&pattern) {
                        continue;
                    }
                    if let Some(first) = owners.get(&pattern) {
                        return Err(VocabularyError::Duplicate {
                            term: pattern,
                            first: first.clone(),
                            second: display,
                        });
                    }
                    owners.insert(pattern.clone(), display.clone());
                    patterns.push(pattern);
                }

                entries.push(VocabularyEntry {
                    category,
                    display,
                    canonical,
                    patterns,
                });
            }
        }

        Ok(Self { version, entries })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// True when `canonical` is the canonical form or an alias of any entry.
    pub fn knows(&self, canonical: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.patterns.iter().any(|p| p == canonical))
    }
}

/// Canonical comparison form: ASCII-lowercase with single spaces. Only ASCII
/// letters are folded, matching the term matcher's case folding.
pub fn canonicalize(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_vocabulary_loads() {
        let vocabulary = Vocabulary::embedded().unwrap();
        assert!(!vocabulary.version().is_empty());
        for category in KeywordCategory::ALL {
            assert!(
                vocabulary.entries().iter().any(|e| e.category == category),
                "no terms for {}",
                category.label()
            );
        }
    }

    #[test]
    fn test_aliases_fold_to_entry() {
        let vocabulary = Vocabulary::embedded().unwrap();
        let k8s = vocabulary
            .entries()
            .iter()
            .find(|e| e.canonical == "kubernetes")
            .unwrap();
        assert_eq!(k8s.display, "Kubernetes");
        assert!(k8s.patterns.contains(&"k8s".to_string()));
        assert!(vocabulary.knows("k8s"));
        assert!(!vocabulary.knows("cobol"));
    }

    #[test]
    fn test_duplicate_alias_across_entries_rejected() {
        let raw = r#"
            version = "test"
            [[technical_skills]]
            name = "Kubernetes"
            aliases = ["k8s"]
            [[certifications]]
            name = "CKA"
            aliases = ["K8s"]
        "#;
        let err = Vocabulary::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, VocabularyError::Duplicate { ref term, .. } if term == "k8s"));
    }

    #[test]
    fn test_repeated_alias_within_entry_is_ignored() {
        let raw = r#"
            version = "test"
            [[education]]
            name = "PhD"
            aliases = ["phd", "Doctorate", "doctorate"]
        "#;
        let vocabulary = Vocabulary::from_toml_str(raw).unwrap();
        assert_eq!(vocabulary.entries()[0].patterns, vec!["phd", "doctorate"]);
    }

    #[test]
    fn test_empty_version_rejected() {
        let err = Vocabulary::from_toml_str("version = \"  \"").unwrap_err();
        assert!(matches!(err, VocabularyError::Invalid(_)));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "version = \"custom-1\"\n[[technical_skills]]\nname = \"COBOL\""
        )
        .unwrap();

        let vocabulary = Vocabulary::load(Some(file.path())).unwrap();
        assert_eq!(vocabulary.version(), "custom-1");
        assert_eq!(vocabulary.entries().len(), 1);
        assert_eq!(vocabulary.entries()[0].canonical, "cobol");
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("  Machine   Learning "), "machine learning");
    }
}

//! Term Extractor: finds vocabulary terms, listed requirement terms and
//! experience indicators in normalized text.
//!
//! Matching is case-insensitive, prefers the longest phrase at each position
//! and only accepts hits that sit on word boundaries, so "Java" never matches
//! inside "JavaScript".

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, Match, MatchKind};
use regex::Regex;

use crate::analysis::vocabulary::{canonicalize, KeywordCategory, Vocabulary, VocabularyError};
use crate::extraction::{ExtractedText, SectionKind};

/// Upper bound on terms lifted from requirement lists per job description.
const MAX_LISTED_TERMS: usize = 25;
/// Longest phrase accepted as a listed term.
const MAX_LISTED_WORDS: usize = 3;
/// Stated year counts above this are treated as noise ("100 years of ...").
const MAX_STATED_YEARS: u32 = 50;

/// Phrases that introduce a requirement rather than name a skill.
const LEAD_INS: &[&str] = &[
    "working knowledge of ",
    "experience with ",
    "experience in ",
    "experience using ",
    "knowledge of ",
    "proficiency in ",
    "proficiency with ",
    "proficient in ",
    "proficient with ",
    "familiarity with ",
    "familiar with ",
    "expertise in ",
    "understanding of ",
    "background in ",
    "exposure to ",
    "skilled in ",
    "hands-on ",
    "strong ",
    "solid ",
    "deep ",
];

/// Words that disqualify a list item from being a term.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "bonus", "by", "degree", "etc", "excellent",
    "experience", "for", "from", "good", "great", "in", "including", "is", "it", "knowledge",
    "must", "nice", "of", "on", "or", "our", "plus", "preferred", "required", "skills", "strong",
    "team", "the", "to", "we", "will", "with", "work", "years", "you", "your",
];

/// Words allowed in lowercase inside a certification item.
const CERTIFICATION_WORDS: &[&str] = &["certification", "certifications", "certified", "certificate"];

fn stated_years_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").expect("years pattern is valid")
    })
}

fn year_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b((?:19|20)\d{2})\s*(?:-|–|—|to)\s*(?:[a-z]{3,9}\.?\s+)?((?:19|20)\d{2}|present|current|now|today)\b",
        )
        .expect("year range pattern is valid")
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Extracted term model
// ────────────────────────────────────────────────────────────────────────────

/// One distinct term found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub canonical: String,
    /// Spelling shown to users: the vocabulary name, or the first spelling in
    /// the job description for listed terms.
    pub display: String,
    pub occurrences: u32,
    /// Byte offset of the first occurrence; orders terms within a category.
    pub first_offset: usize,
    /// Sections the term was seen in; `None` is text outside any section.
    pub contexts: BTreeSet<Option<SectionKind>>,
    pub from_vocabulary: bool,
}

impl Term {
    pub fn seen_in(&self, kind: SectionKind) -> bool {
        self.contexts.contains(&Some(kind))
    }
}

/// Terms of one document per category, each list in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSet {
    terms: BTreeMap<KeywordCategory, Vec<Term>>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            terms: KeywordCategory::ALL
                .iter()
                .map(|c| (*c, Vec::new()))
                .collect(),
        }
    }
}

impl KeywordSet {
    pub fn get(&self, category: KeywordCategory) -> &[Term] {
        self.terms.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, category: KeywordCategory, canonical: &str) -> Option<&Term> {
        self.get(category).iter().find(|t| t.canonical == canonical)
    }

    /// Display names per category, in first-seen order.
    pub fn displays(&self, category: KeywordCategory) -> Vec<String> {
        self.get(category).iter().map(|t| t.display.clone()).collect()
    }

    /// Counts a hit at byte `offset`. New terms are inserted by offset, so a
    /// later scan over the same text keeps first-seen order.
    fn record(&mut self, hit: Hit<'_>, offset: usize, context: Option<SectionKind>) {
        let terms = self.terms.entry(hit.category).or_default();
        match terms.iter_mut().find(|t| t.canonical == hit.canonical) {
            Some(term) => {
                term.occurrences += 1;
                term.first_offset = term.first_offset.min(offset);
                term.contexts.insert(context);
            }
            None => {
                let at = terms.partition_point(|t| t.first_offset <= offset);
                terms.insert(
                    at,
                    Term {
                        canonical: hit.canonical.to_string(),
                        display: hit.display.to_string(),
                        occurrences: 1,
                        first_offset: offset,
                        contexts: BTreeSet::from([context]),
                        from_vocabulary: hit.from_vocabulary,
                    },
                );
            }
        }
    }
}

/// Everything the matcher needs from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTerms {
    pub keywords: KeywordSet,
    /// For a job description, the years it asks for. For a resume, the larger
    /// of the years it states and the span its date ranges cover.
    pub experience_years: Option<u32>,
    pub has_experience_section: bool,
}

struct Hit<'a> {
    category: KeywordCategory,
    canonical: &'a str,
    display: &'a str,
    from_vocabulary: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor
// ────────────────────────────────────────────────────────────────────────────

/// Vocabulary matcher built once at startup and shared across requests.
pub struct TermExtractor {
    vocabulary: Arc<Vocabulary>,
    matcher: AhoCorasick,
    /// Vocabulary entry index per matcher pattern.
    pattern_entries: Vec<usize>,
}

impl TermExtractor {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Result<Self, VocabularyError> {
        let mut patterns = Vec::new();
        let mut pattern_entries = Vec::new();
        for (index, entry) in vocabulary.entries().iter().enumerate() {
            for pattern in &entry.patterns {
                patterns.push(pattern.clone());
                pattern_entries.push(index);
            }
        }

        let matcher = build_matcher(&patterns)
            .map_err(|e| VocabularyError::Invalid(format!("cannot build matcher: {e}")))?;

        Ok(Self {
            vocabulary,
            matcher,
            pattern_entries,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Extracts vocabulary terms, listed requirement terms and required years
    /// from a job description.
    pub fn extract_job_description(&self, job: &ExtractedText) -> DocumentTerms {
        let mut keywords = KeywordSet::default();
        self.scan_vocabulary(job, &mut keywords);

        let listed = self.listed_terms(job);
        if !listed.is_empty() {
            scan_listed(job, &listed, &mut keywords);
        }

        DocumentTerms {
            keywords,
            experience_years: stated_years(job.text()),
            has_experience_section: job.has_section(SectionKind::Experience),
        }
    }

    /// Extracts vocabulary terms and experience indicators from a resume.
    /// `reference_year` stands in for "Present" in date ranges.
    pub fn extract_resume(&self, resume: &ExtractedText, reference_year: i32) -> DocumentTerms {
        let mut keywords = KeywordSet::default();
        self.scan_vocabulary(resume, &mut keywords);

        let experience_years = match (
            stated_years(resume.text()),
            career_span_years(resume.text(), reference_year),
        ) {
            (Some(stated), Some(span)) => Some(stated.max(span)),
            (stated, span) => stated.or(span),
        };

        DocumentTerms {
            keywords,
            experience_years,
            has_experience_section: resume.has_section(SectionKind::Experience),
        }
    }

    /// Looks for the job description's listed (non-vocabulary) terms in the
    /// resume, so they can match like vocabulary terms do.
    pub fn add_listed_terms(
        &self,
        resume: &ExtractedText,
        resume_terms: &mut DocumentTerms,
        job_terms: &DocumentTerms,
    ) {
        let listed: Vec<ListedTerm> = KeywordCategory::ALL
            .iter()
            .flat_map(|category| {
                job_terms
                    .keywords
                    .get(*category)
                    .iter()
                    .filter(|t| !t.from_vocabulary)
                    .map(|t| ListedTerm {
                        category: *category,
                        canonical: t.canonical.clone(),
                        display: t.display.clone(),
                    })
            })
            .collect();

        if !listed.is_empty() {
            scan_listed(resume, &listed, &mut resume_terms.keywords);
        }
    }

    fn scan_vocabulary(&self, doc: &ExtractedText, keywords: &mut KeywordSet) {
        let text = doc.text();
        for m in bounded_matches(&self.matcher, text) {
            let entry = &self.vocabulary.entries()[self.pattern_entries[m.pattern().as_usize()]];
            keywords.record(
                Hit {
                    category: entry.category,
                    canonical: &entry.canonical,
                    display: &entry.display,
                    from_vocabulary: true,
                },
                m.start(),
                doc.section_at(m.start()),
            );
        }
    }

    /// Short capitalized or tech-looking items from requirement and skill
    /// lists that the vocabulary does not know.
    fn listed_terms(&self, job: &ExtractedText) -> Vec<ListedTerm> {
        let mut listed: Vec<ListedTerm> = Vec::new();

        for kind in [SectionKind::Requirements, SectionKind::Skills] {
            let body = job.section_text(kind);
            for item in split_list_items(&body) {
                if listed.len() >= MAX_LISTED_TERMS {
                    return listed;
                }
                let Some(display) = clean_list_item(item) else {
                    continue;
                };
                let canonical = canonicalize(display);
                if self.vocabulary.knows(&canonical)
                    || listed.iter().any(|l| l.canonical == canonical)
                {
                    continue;
                }
                let category = if canonical.contains("certif") {
                    KeywordCategory::Certifications
                } else {
                    KeywordCategory::TechnicalSkills
                };
                listed.push(ListedTerm {
                    category,
                    canonical,
                    display: display.to_string(),
                });
            }
        }

        listed
    }
}

struct ListedTerm {
    category: KeywordCategory,
    canonical: String,
    display: String,
}

fn build_matcher<P: AsRef<[u8]>>(patterns: &[P]) -> Result<AhoCorasick, aho_corasick::BuildError> {
    AhoCorasickBuilder::new()
        .match_kind(MatchKind::Standard)
        .ascii_case_insensitive(true)
        .build(patterns)
}

fn scan_listed(doc: &ExtractedText, listed: &[ListedTerm], keywords: &mut KeywordSet) {
    let patterns: Vec<&str> = listed.iter().map(|l| l.canonical.as_str()).collect();
    let Ok(matcher) = build_matcher(&patterns) else {
        return;
    };

    for m in bounded_matches(&matcher, doc.text()) {
        let term = &listed[m.pattern().as_usize()];
        keywords.record(
            Hit {
                category: term.category,
                canonical: &term.canonical,
                display: &term.display,
                from_vocabulary: false,
            },
            m.start(),
            doc.section_at(m.start()),
        );
    }
}

/// Longest hit at each position that starts and ends on word boundaries,
/// scanning left to right without overlaps. When the longest candidate runs
/// into a word ("Scrum Masters"), shorter candidates at the same position
/// ("Scrum") still count.
fn bounded_matches(matcher: &AhoCorasick, text: &str) -> Vec<Match> {
    let mut candidates: Vec<Match> = matcher
        .find_overlapping_iter(text)
        .filter(|m| on_word_boundaries(text, m.start(), m.end()))
        .collect();
    candidates.sort_unstable_by_key(|m| (m.start(), Reverse(m.end())));

    let mut found = Vec::new();
    let mut pos = 0;
    for m in candidates {
        if m.start() >= pos {
            pos = m.end();
            found.push(m);
        }
    }

    found
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Word-character edges of a hit must not touch other word characters. Edges
/// that are punctuation ("C++", ".NET") carry no constraint.
fn on_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let hit = &text[start..end];

    let first_is_word = hit.chars().next().is_some_and(is_word_char);
    if first_is_word && text[..start].chars().next_back().is_some_and(is_word_char) {
        return false;
    }

    let last_is_word = hit.chars().next_back().is_some_and(is_word_char);
    if last_is_word && text[end..].chars().next().is_some_and(is_word_char) {
        return false;
    }

    true
}

fn split_list_items(body: &str) -> Vec<&str> {
    body.split(['\n', ',', ';', '•', '·', '|', '(', ')', ':'])
        .flat_map(|chunk| chunk.split(" and "))
        .flat_map(|chunk| chunk.split(" or "))
        .collect()
}

/// Trims bullets and lead-ins from a list item and keeps it only when it reads
/// like a proper term.
fn clean_list_item(item: &str) -> Option<&str> {
    let mut item = item
        .trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'));

    while let Some(lead) = LEAD_INS.iter().find(|lead| {
        item.get(..lead.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(lead))
    }) {
        item = item[lead.len()..].trim_start();
    }

    let words: Vec<&str> = item.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_LISTED_WORDS {
        return None;
    }
    if !item.chars().any(char::is_alphabetic) || item.chars().count() < 2 {
        return None;
    }

    let looks_like_term = words.iter().all(|word| {
        let lower = word.to_lowercase();
        if STOP_WORDS.contains(&lower.as_str()) {
            return false;
        }
        CERTIFICATION_WORDS.contains(&lower.as_str()) || looks_like_term_word(word)
    });

    looks_like_term.then_some(item)
}

/// Capitalized ("Kafka"), mixed-case ("gRPC") or symbol-bearing ("k8s",
/// "C#") tokens.
fn looks_like_term_word(word: &str) -> bool {
    let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
    let has_upper = word.chars().any(char::is_uppercase);
    let has_symbol = word
        .chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '+' | '#' | '.' | '/'));
    starts_upper || has_upper || has_symbol
}

/// Largest "N years" / "N+ yrs" figure in the text.
pub fn stated_years(text: &str) -> Option<u32> {
    stated_years_regex()
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .filter(|years| (1..=MAX_STATED_YEARS).contains(years))
        .max()
}

/// Years covered by date ranges such as "2019 - 2023" or "Jan 2020 – Present",
/// with overlapping ranges merged.
pub fn career_span_years(text: &str, reference_year: i32) -> Option<u32> {
    let mut ranges: Vec<(i32, i32)> = year_range_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let start = caps[1].parse::<i32>().ok()?;
            let end = match caps[2].parse::<i32>() {
                Ok(year) => year,
                Err(_) => reference_year,
            };
            (start <= end && end <= reference_year + 1).then_some((start, end))
        })
        .collect();

    if ranges.is_empty() {
        return None;
    }

    ranges.sort_unstable();
    let mut total = 0;
    let (mut current_start, mut current_end) = ranges[0];
    for &(start, end) in &ranges[1..] {
        if start <= current_end {
            current_end = current_end.max(end);
        } else {
            total += current_end - current_start;
            (current_start, current_end) = (start, end);
        }
    }
    total += current_end - current_start;

    u32::try_from(total).ok()
}

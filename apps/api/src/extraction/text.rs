//! Normalized document text with section spans.

use serde::Serialize;

/// Structural blocks recognized in resumes and job descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Projects,
    Requirements,
}

/// Header phrases per section, compared against a lowercased line with bullets
/// and a trailing colon removed.
const SECTION_HEADERS: &[(SectionKind, &[&str])] = &[
    (
        SectionKind::Requirements,
        &[
            "requirements",
            "job requirements",
            "qualifications",
            "minimum qualifications",
            "basic qualifications",
            "preferred qualifications",
            "required qualifications",
            "what you'll need",
            "what you will need",
            "what we're looking for",
            "what we are looking for",
            "what you bring",
            "must have",
            "must haves",
            "nice to have",
            "nice to haves",
            "who you are",
        ],
    ),
    (
        SectionKind::Experience,
        &[
            "experience",
            "work experience",
            "professional experience",
            "relevant experience",
            "work history",
            "employment",
            "employment history",
            "career history",
        ],
    ),
    (
        SectionKind::Education,
        &[
            "education",
            "academic background",
            "academics",
            "education and training",
            "academic qualifications",
        ],
    ),
    (
        SectionKind::Skills,
        &[
            "skills",
            "technical skills",
            "core skills",
            "key skills",
            "skills and tools",
            "competencies",
            "core competencies",
            "expertise",
            "areas of expertise",
            "technologies",
            "tech stack",
        ],
    ),
    (
        SectionKind::Certifications,
        &[
            "certifications",
            "certification",
            "certificates",
            "licenses",
            "licenses and certifications",
            "licenses & certifications",
        ],
    ),
    (
        SectionKind::Projects,
        &["projects", "personal projects", "selected projects", "key projects"],
    ),
    (
        SectionKind::Summary,
        &[
            "summary",
            "professional summary",
            "profile",
            "professional profile",
            "objective",
            "career objective",
            "about",
            "about me",
        ],
    ),
];

/// Headers longer than this are treated as prose.
const MAX_HEADER_WORDS: usize = 4;

/// Byte range `[start, end)` of one section body inside `ExtractedText::text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSpan {
    pub kind: SectionKind,
    pub start: usize,
    pub end: usize,
}

/// Normalized text of one document. Immutable once built.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    text: String,
    sections: Vec<SectionSpan>,
}

impl ExtractedText {
    /// Normalizes raw extractor output and detects section boundaries.
    pub fn from_raw(raw: &str) -> Self {
        let text = normalize(raw);
        let sections = detect_sections(&text);
        Self { text, sections }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        !self.text.chars().any(|c| c.is_alphanumeric())
    }

    pub fn sections(&self) -> &[SectionSpan] {
        &self.sections
    }

    /// Section containing the byte offset, if any.
    pub fn section_at(&self, offset: usize) -> Option<SectionKind> {
        self.sections
            .iter()
            .find(|s| s.start <= offset && offset < s.end)
            .map(|s| s.kind)
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.sections
            .iter()
            .any(|s| s.kind == kind && !self.text[s.start..s.end].trim().is_empty())
    }

    /// Concatenated body of every span of `kind`, one span per line.
    pub fn section_text(&self, kind: SectionKind) -> String {
        self.sections
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| self.text[s.start..s.end].trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Strips control characters, collapses whitespace per line and drops runs of
/// blank lines. Line structure is kept for section detection.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\r' | '\u{c}' | '\u{2028}' | '\u{2029}' => cleaned.push('\n'),
            '\t' | '\u{a0}' => cleaned.push(' '),
            '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' => {}
            '\n' => cleaned.push('\n'),
            c if c.is_control() => {}
            c => cleaned.push(c),
        }
    }

    let mut out = String::with_capacity(cleaned.len());
    let mut previous_blank = true;
    for line in cleaned.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            if !previous_blank {
                out.push('\n');
            }
            previous_blank = true;
            continue;
        }
        out.push_str(&collapsed);
        out.push('\n');
        previous_blank = false;
    }

    out.trim_end().to_string()
}

/// Recognizes a header line. Returns the section and, for `Header: content`
/// lines, the byte offset within the line where the content begins.
fn match_header(line: &str) -> Option<(SectionKind, Option<usize>)> {
    let stripped = line.trim_start_matches(|c: char| {
        c == '#' || c == '*' || c == '-' || c == '•' || c.is_whitespace()
    });
    let lead = line.len() - stripped.len();

    let whole = stripped.trim_end().trim_end_matches(':').trim_end();
    if let Some(kind) = lookup_header(whole) {
        return Some((kind, None));
    }

    let colon = stripped.find(':')?;
    let prefix = stripped[..colon].trim();
    let kind = lookup_header(prefix)?;
    let rest = &stripped[colon + 1..];
    let content_offset = lead + colon + 1 + (rest.len() - rest.trim_start().len());
    Some((kind, Some(content_offset)))
}

fn lookup_header(candidate: &str) -> Option<SectionKind> {
    if candidate.is_empty() || candidate.split_whitespace().count() > MAX_HEADER_WORDS {
        return None;
    }
    let lower = candidate.to_lowercase();
    SECTION_HEADERS
        .iter()
        .find(|(_, phrases)| phrases.contains(&lower.as_str()))
        .map(|(kind, _)| *kind)
}

fn detect_sections(text: &str) -> Vec<SectionSpan> {
    let mut spans = Vec::new();
    let mut open: Option<(SectionKind, usize)> = None;
    let mut line_start = 0;

    for line in text.split('\n') {
        let line_end = line_start + line.len();
        if let Some((kind, inline)) = match_header(line) {
            if let Some((open_kind, start)) = open.take() {
                spans.push(SectionSpan {
                    kind: open_kind,
                    start,
                    end: line_start,
                });
            }
            let body_start = match inline {
                Some(offset) => line_start + offset,
                None => (line_end + 1).min(text.len()),
            };
            open = Some((kind, body_start));
        }
        line_start = line_end + 1;
    }

    if let Some((kind, start)) = open {
        spans.push(SectionSpan {
            kind,
            start,
            end: text.len(),
        });
    }

    spans.retain(|s| s.start < s.end);
    spans
}

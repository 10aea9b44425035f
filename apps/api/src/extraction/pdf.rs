use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::ExtractionError;

fn page_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:page\s*)?-?\s*\d{1,3}\s*-?\s*(?:(?:of|/)\s*\d{1,3})?\s*$")
            .expect("page number pattern is valid")
    })
}

/// Extracts plain text from PDF bytes.
///
/// `pdf_extract` can panic on malformed object streams, so the call is
/// isolated and a panic is reported like any other structural failure.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(strip_page_furniture(&text)),
        Ok(Err(e)) => Err(ExtractionError::CorruptDocument(format!(
            "Error reading PDF: {e}"
        ))),
        Err(_) => Err(ExtractionError::CorruptDocument(
            "Error reading PDF: malformed document structure".to_string(),
        )),
    }
}

/// Removes page numbers and running headers/footers.
///
/// Pages are split on form feeds. A line is a running header (footer) when it
/// is the first (last) non-empty line of every page of a multi-page document.
pub fn strip_page_furniture(text: &str) -> String {
    let pages: Vec<Vec<&str>> = text
        .split('\u{c}')
        .map(|page| {
            page.lines()
                .filter(|line| !line.trim().is_empty())
                .filter(|line| !page_number_regex().is_match(line))
                .collect::<Vec<_>>()
        })
        .filter(|lines| !lines.is_empty())
        .collect();

    let mut running: HashSet<String> = HashSet::new();
    if pages.len() >= 2 {
        let firsts: Vec<&str> = pages
            .iter()
            .filter_map(|p| p.first())
            .map(|l| l.trim())
            .collect();
        let lasts: Vec<&str> = pages
            .iter()
            .filter_map(|p| p.last())
            .map(|l| l.trim())
            .collect();
        for edge in [firsts, lasts] {
            if edge.len() == pages.len() && edge.windows(2).all(|w| w[0] == w[1]) {
                running.insert(edge[0].to_string());
            }
        }
    }

    pages
        .iter()
        .map(|lines| {
            let mut kept: Vec<&str> = lines.clone();
            if !running.is_empty() {
                if kept.first().is_some_and(|l| running.contains(l.trim())) {
                    kept.remove(0);
                }
                if kept.last().is_some_and(|l| running.contains(l.trim())) {
                    kept.pop();
                }
            }
            kept.join("\n")
        })
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

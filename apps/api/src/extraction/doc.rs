//! Legacy Word 97-2003 (`.doc`) recovery.
//!
//! The binary format stores body text either as 8-bit characters or as UTF-16LE
//! inside the `WordDocument` stream. Instead of walking the compound file, the
//! extractor recovers long printable runs in both encodings and keeps whichever
//! yields more words. Formatting tables and binary noise rarely form long runs
//! of letters and spaces, which the run filter relies on.

use super::ExtractionError;

/// Compound files are at least one header sector long.
const MIN_COMPOUND_FILE_BYTES: usize = 512;
const MIN_RUN_CHARS: usize = 12;
/// Share of letters, digits and spaces a run needs to count as prose.
const MIN_TEXT_RATIO: f32 = 0.8;

pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.len() < MIN_COMPOUND_FILE_BYTES {
        return Err(ExtractionError::CorruptDocument(
            "Error reading DOC: truncated compound file".to_string(),
        ));
    }

    let narrow = collect_runs(bytes.iter().map(|&b| decode_byte(b)));
    // Text pieces may start at either parity, so try both alignments.
    let wide_even = collect_wide_runs(bytes);
    let wide_odd = collect_wide_runs(&bytes[1..]);

    // Ties go to the last candidate, so plain 8-bit text wins them.
    Ok([wide_odd, wide_even, narrow]
        .into_iter()
        .max_by_key(|text| word_count(text))
        .unwrap_or_default())
}

fn collect_wide_runs(bytes: &[u8]) -> String {
    collect_runs(bytes.chunks_exact(2).map(|pair| match pair {
        [lo, 0] => decode_byte(*lo),
        _ => None,
    }))
}

fn decode_byte(b: u8) -> Option<char> {
    match b {
        b'\r' | b'\n' | 0x0b => Some('\n'),
        b'\t' => Some(' '),
        0x20..=0x7e => Some(b as char),
        _ => None,
    }
}

fn collect_runs(chars: impl Iterator<Item = Option<char>>) -> String {
    let mut out = String::new();
    let mut run = String::new();

    for c in chars {
        match c {
            Some(c) => run.push(c),
            None => flush(&mut run, &mut out),
        }
    }
    flush(&mut run, &mut out);
    out
}

fn flush(run: &mut String, out: &mut String) {
    if is_prose(run) {
        out.push_str(run.trim());
        out.push('\n');
    }
    run.clear();
}

fn is_prose(run: &str) -> bool {
    let total = run.chars().count();
    if total < MIN_RUN_CHARS || !run.contains(' ') {
        return false;
    }
    let texty = run
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '\n')
        .count();
    texty as f32 / total as f32 >= MIN_TEXT_RATIO
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use zip::ZipArchive;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";
/// Upper bound on the decompressed main part.
const MAX_PART_BYTES: u64 = 32 * 1024 * 1024;

fn run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br\b[^>]*/>|<w:cr/>|</w:p>")
            .expect("docx run pattern is valid")
    })
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);")
            .expect("xml entity pattern is valid")
    })
}

/// Extracts paragraph text from a DOCX (OOXML) archive.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        ExtractionError::CorruptDocument(format!("Error reading DOCX archive: {e}"))
    })?;

    let part = archive.by_name(DOCUMENT_PART).map_err(|_| {
        ExtractionError::CorruptDocument(format!("DOCX archive has no {DOCUMENT_PART} part"))
    })?;

    if part.size() > MAX_PART_BYTES {
        return Err(ExtractionError::CorruptDocument(
            "DOCX document part is too large".to_string(),
        ));
    }

    let mut xml = String::new();
    part.take(MAX_PART_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::CorruptDocument(format!("Error reading DOCX: {e}")))?;

    Ok(document_xml_to_text(&xml))
}

/// Flattens WordprocessingML into text: runs are concatenated, paragraph ends
/// and breaks become newlines.
pub fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    for caps in run_regex().captures_iter(xml) {
        match caps.get(1) {
            Some(run) => out.push_str(&decode_entities(run.as_str())),
            None if &caps[0] == "<w:tab/>" => out.push('\t'),
            None => out.push('\n'),
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            match name {
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "amp" => "&".to_string(),
                _ => {
                    let code = match name.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => name[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_default()
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Builds a minimal DOCX archive with one paragraph per line.
    pub(crate) fn build_docx(lines: &[&str]) -> Vec<u8> {
        let body: String = lines
            .iter()
            .map(|l| {
                let escaped = l
                    .replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;");
                format!(r#"<w:p><w:r><w:t xml:space="preserve">{escaped}</w:t></w:r></w:p>"#)
            })
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extracts_paragraphs() {
        let bytes = build_docx(&["Jane Doe", "Skills", "Rust & Python <3"]);
        let text = extract_text(&bytes).unwrap();
        assert_eq!(text, "Jane Doe\nSkills\nRust & Python <3\n");
    }

    #[test]
    fn test_runs_tabs_and_breaks() {
        let xml = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Acme</w:t></w:r><w:r><w:tab/><w:t>2019</w:t><w:br/><w:t>Lead</w:t></w:r></w:p>"#;
        assert_eq!(document_xml_to_text(xml), "Acme\t2019\nLead\n");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(decode_entities("caf&#233; &#x2013; ok"), "café – ok");
    }

    #[test]
    fn test_zip_without_document_part_is_corrupt() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("hello.txt", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"hi").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let result = extract_text(&bytes);
        assert!(matches!(result, Err(ExtractionError::CorruptDocument(_))));
    }

    #[test]
    fn test_truncated_archive_is_corrupt() {
        let result = extract_text(b"PK\x03\x04 truncated");
        assert!(matches!(result, Err(ExtractionError::CorruptDocument(_))));
    }
}

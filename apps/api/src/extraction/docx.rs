use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

/// Loads the main document part of a DOCX as one section of
/// newline-separated paragraphs.
pub(super) fn load_sections(path: &Path) -> Result<Vec<String>, String> {
    let file = File::open(path).map_err(|e| format!("cannot open file: {e}"))?;
    let mut archive = ZipArchive::new(file).map_err(|e| format!("not a DOCX archive: {e}"))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| format!("missing word/document.xml: {e}"))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("failed to read document.xml: {e}"))?;

    Ok(vec![paragraphs(&xml)?.join("\n")])
}

/// Collects the text of every `w:p`, honouring `w:tab` and `w:br`.
fn paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"br" | b"cr" => current.push('\n'),
                b"tab" => current.push('\t'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| format!("bad text run: {e}"))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fixtures;

    #[test]
    fn test_paragraph_text_runs_tabs_and_breaks() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
            <w:p><w:r><w:t>Skills:</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve">Rust &amp; Go</w:t></w:r></w:p>
            <w:p/>
            <w:p><w:r><w:t>line one</w:t><w:br/><w:t>line two</w:t></w:r></w:p>
        </w:body></w:document>"#;

        assert_eq!(
            paragraphs(xml).unwrap(),
            vec!["Skills:\tRust & Go", "", "line one\nline two"]
        );
    }

    #[test]
    fn test_text_outside_runs_is_ignored() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:instrText>PAGE</w:instrText></w:p></w:body></w:document>"#;
        assert_eq!(paragraphs(xml).unwrap(), vec![""]);
    }

    #[test]
    fn test_loads_docx_archive() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        std::io::Write::write_all(&mut file, &fixtures::docx(&["Jane Doe", "Rust"])).unwrap();

        assert_eq!(load_sections(file.path()).unwrap(), vec!["Jane Doe\nRust"]);
    }

    #[test]
    fn test_plain_zip_without_document_part_fails() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"PK not really").unwrap();

        assert!(load_sections(file.path()).is_err());
    }
}

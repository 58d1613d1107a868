//! Document text extraction for uploaded résumés (PDF and DOCX).
//!
//! Loading is blocking work and runs inside `tokio::task::spawn_blocking`.
//! Uploads are staged in a named temp file that is removed when the
//! extraction finishes, whatever the outcome.

mod docx;
mod normalize;
mod pdf;

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Only PDF and DOCX are supported.")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from {format} file: {message}")]
    Extraction {
        format: &'static str,
        message: String,
    },

    #[error("File is {size} bytes, larger than the {limit}-byte upload limit")]
    TooLarge { size: usize, limit: u64 },

    #[error("Failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Accepts `pdf`, `.PDF`, `docx`, ...
    pub fn from_extension(extension: &str) -> Result<Self, ExtractError> {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(ExtractError::UnsupportedFormat(extension.to_string())),
        }
    }

    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ExtractError::UnsupportedFormat(file_name.to_string()))
            .and_then(Self::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
        }
    }
}

/// Init-time extraction settings, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub max_upload_bytes: u64,
    /// Fold ligatures, smart quotes and non-breaking spaces to plain ASCII.
    pub normalize_text: bool,
    /// Where uploads are staged; the system temp dir when unset.
    pub staging_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            normalize_text: true,
            staging_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextExtractor {
    config: ExtractorConfig,
}

impl TextExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Validates an upload's name and size before anything is staged.
    pub fn check_upload(&self, file_name: &str, size: usize) -> Result<DocumentFormat, ExtractError> {
        let format = DocumentFormat::from_file_name(file_name)?;
        if size as u64 > self.config.max_upload_bytes {
            return Err(ExtractError::TooLarge {
                size,
                limit: self.config.max_upload_bytes,
            });
        }
        Ok(format)
    }

    /// Extracts plain text from a file on disk. Non-empty segments (PDF pages,
    /// the DOCX body) are joined with a blank line.
    pub fn extract(&self, path: &Path, extension: &str) -> Result<String, ExtractError> {
        let format = DocumentFormat::from_extension(extension)?;
        let segments = match format {
            DocumentFormat::Pdf => pdf::load_pages(path),
            DocumentFormat::Docx => docx::load_sections(path),
        }
        .map_err(|message| ExtractError::Extraction {
            format: format.label(),
            message,
        })?;

        let text = join_segments(segments);
        debug!("Extracted {} characters from {}", text.len(), path.display());

        Ok(if self.config.normalize_text {
            normalize::normalize_text(&text)
        } else {
            text
        })
    }

    /// Stages `bytes` in a temp file carrying the upload's extension and
    /// extracts it on a blocking thread. The temp file is gone when this returns.
    pub async fn extract_upload(&self, file_name: &str, bytes: bytes::Bytes) -> Result<String, ExtractError> {
        let format = self.check_upload(file_name, bytes.len())?;
        let extractor = self.clone();
        info!("Extracting text from '{file_name}' ({} bytes)", bytes.len());

        tokio::task::spawn_blocking(move || {
            let suffix = format!(".{}", format.extension());
            let mut builder = tempfile::Builder::new();
            builder.prefix("resume-upload-").suffix(&suffix);
            let mut staged = match &extractor.config.staging_dir {
                Some(dir) => builder.tempfile_in(dir)?,
                None => builder.tempfile()?,
            };
            staged.write_all(&bytes)?;
            staged.flush()?;
            extractor.extract(staged.path(), format.extension())
        })
        .await
        .map_err(|e| ExtractError::Extraction {
            format: format.label(),
            message: format!("extraction task aborted: {e}"),
        })?
    }
}

fn join_segments(segments: Vec<String>) -> String {
    segments
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Builds a minimal DOCX with one `w:p` per paragraph.
    pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension(".DOCX").unwrap(), DocumentFormat::Docx);
        assert!(matches!(
            DocumentFormat::from_extension("txt"),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(DocumentFormat::from_file_name("cv.final.pdf").unwrap(), DocumentFormat::Pdf);
        assert!(DocumentFormat::from_file_name("resume").is_err());
        assert!(DocumentFormat::from_file_name("resume.doc").is_err());
    }

    #[test]
    fn test_join_skips_empty_segments() {
        let joined = join_segments(vec![
            "Page one".to_string(),
            "  \n".to_string(),
            String::new(),
            "Page three".to_string(),
        ]);
        assert_eq!(joined, "Page one\n\nPage three");
    }

    #[test]
    fn test_check_upload_enforces_size_limit() {
        let extractor = TextExtractor::new(ExtractorConfig {
            max_upload_bytes: 4,
            normalize_text: false,
            staging_dir: None,
        });
        assert!(matches!(
            extractor.check_upload("cv.pdf", 5),
            Err(ExtractError::TooLarge { size: 5, limit: 4 })
        ));
        assert!(extractor.check_upload("cv.pdf", 4).is_ok());
    }

    #[test]
    fn test_extract_rejects_unsupported_extension() {
        let extractor = TextExtractor::new(ExtractorConfig::default());
        let err = extractor.extract(Path::new("/nonexistent/cv.txt"), "txt").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_corrupt_pdf_is_an_extraction_error() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"definitely not a pdf").unwrap();

        let extractor = TextExtractor::new(ExtractorConfig::default());
        let err = extractor.extract(file.path(), "pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Extraction { format: "PDF", .. }));
    }

    fn staging_extractor(dir: &Path) -> TextExtractor {
        TextExtractor::new(ExtractorConfig {
            staging_dir: Some(dir.to_path_buf()),
            ..ExtractorConfig::default()
        })
    }

    fn staged_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_extract_upload_reads_docx_and_cleans_up() {
        let staging = tempfile::tempdir().unwrap();
        let extractor = staging_extractor(staging.path());
        let bytes = fixtures::docx(&["Asha Rao", "asha@example.com"]);

        let text = extractor
            .extract_upload("resume.docx", bytes::Bytes::from(bytes))
            .await
            .unwrap();

        assert_eq!(text, "Asha Rao\nasha@example.com");
        assert_eq!(staged_files(staging.path()), 0);
    }

    #[tokio::test]
    async fn test_extract_upload_cleans_up_on_failure() {
        let staging = tempfile::tempdir().unwrap();
        let extractor = staging_extractor(staging.path());

        let result = extractor
            .extract_upload("resume.docx", bytes::Bytes::from_static(b"not a zip"))
            .await;

        assert!(matches!(result, Err(ExtractError::Extraction { format: "DOCX", .. })));
        assert_eq!(staged_files(staging.path()), 0);
    }
}

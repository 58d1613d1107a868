use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Page break emitted by pdf-extract's plain-text output.
const PAGE_BREAK: char = '\u{c}';

/// Loads a PDF and returns its text split into pages.
///
/// pdf-extract panics on some malformed font programs, so the call is
/// isolated and a panic is reported like any other load failure.
pub(super) fn load_pages(path: &Path) -> Result<Vec<String>, String> {
    let text = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path)))
        .map_err(|_| "PDF loader panicked on malformed content".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(text.split(PAGE_BREAK).map(str::to_string).collect())
}

//! Text extraction from PDFs, HTML pages and JSON record files.

use lopdf::Document;
use scraper::Html;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Input not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn ensure_exists(path: &Path) -> Result<(), ExtractError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ExtractError::NotFound(path.to_path_buf()))
    }
}

/// Text of every page in document order, one string per page.
///
/// A page whose text cannot be decoded yields an empty string so page
/// numbers stay aligned with the PDF.
pub fn extract_pdf_pages(path: &Path) -> Result<Vec<String>, ExtractError> {
    ensure_exists(path)?;
    let doc = Document::load(path)?;
    let pages = doc.get_pages();
    debug!(pages = pages.len(), path = %path.display(), "loaded PDF");

    let mut texts = Vec::with_capacity(pages.len());
    for &number in pages.keys() {
        match doc.extract_text(&[number]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                warn!(page = number, error = %e, "page text extraction failed");
                texts.push(String::new());
            }
        }
    }

    Ok(texts)
}

/// Visible text of an HTML document as trimmed, non-empty lines.
///
/// Each text node contributes its own lines; script and style content is
/// skipped.
pub fn html_text_lines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
        if hidden {
            continue;
        }

        lines.extend(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }

    lines
}

/// Load a JSON array of records.
pub fn load_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ExtractError> {
    ensure_exists(path)?;
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| ExtractError::Json {
        path: path.to_path_buf(),
        source,
    })
}

//! Output: JSON artifacts, the stdout summary line and progress bars.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write any serializable value as pretty JSON. Non-ASCII text is written
/// as UTF-8, not escaped.
pub fn write_json<W: Write, T: Serialize + ?Sized>(value: &T, writer: &mut W) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value)?;
    writer.write_all(json.as_bytes())?;
    Ok(())
}

/// Write pretty JSON to a file, creating parent directories as needed.
pub fn write_json_file<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    write_json(value, &mut file)
}

/// Write the one-line compact JSON summary.
pub fn write_summary<W: Write, T: Serialize + ?Sized>(summary: &T, writer: &mut W) -> Result<(), OutputError> {
    let line = serde_json::to_string(summary)?;
    writeln!(writer, "{}", line)?;
    Ok(())
}

/// Print the summary line to stdout.
pub fn print_summary<T: Serialize + ?Sized>(summary: &T) -> Result<(), OutputError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_summary(summary, &mut handle)
}

/// Progress bar on stderr, or `None` when progress is hidden.
pub fn progress_bar(len: usize, show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    Some(pb)
}

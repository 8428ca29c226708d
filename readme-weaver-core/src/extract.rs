//! Content extraction: turn a file on disk into the text that gets summarised.
//!
//! [`extract`] never fails. It tells the traversal one of three things: here is
//! the payload, skip this file, or the file could not be read. Empty payloads
//! and notebooks that cannot be processed are skipped; a text or tabular file
//! that cannot be read is reported as [`Extracted::Unreadable`] so the caller
//! can record a placeholder for it.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

/// Number of data rows (below the header) shown in a tabular preview.
pub const PREVIEW_ROWS: usize = 2;

/// Outcome of reading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// Non-empty text to summarise.
    Content(String),
    /// Nothing worth summarising.
    Skip,
    /// Reading failed; carries the error message.
    Unreadable(String),
}

/// Read the payload for `path`.
pub fn extract(path: &Path) -> Extracted {
    let read = match path.extension().and_then(|e| e.to_str()) {
        Some("ipynb") => return extract_notebook(path),
        Some("csv") => extract_table_preview(path),
        _ => fs::read_to_string(path),
    };

    match read {
        Ok(contents) if contents.trim().is_empty() => {
            debug!(path = %path.display(), "Extracted content is empty, skipping");
            Extracted::Skip
        }
        Ok(contents) => Extracted::Content(contents),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Error reading file");
            Extracted::Unreadable(e.to_string())
        }
    }
}

/// Concatenate the sources of every code cell, separated by a blank line.
/// Any failure here skips the notebook.
fn extract_notebook(path: &Path) -> Extracted {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Error processing notebook");
            return Extracted::Skip;
        }
    };
    match notebook_code(&raw) {
        Some(code) if !code.trim().is_empty() => Extracted::Content(code),
        Some(_) => Extracted::Skip,
        None => {
            warn!(path = %path.display(), "Error processing notebook: unexpected structure");
            Extracted::Skip
        }
    }
}

/// Pull code cells out of notebook JSON. `None` when the document is not a notebook.
pub fn notebook_code(raw: &str) -> Option<String> {
    let notebook: Value = serde_json::from_str(raw).ok()?;
    let cells = notebook.get("cells")?.as_array()?;

    let mut blocks = Vec::new();
    for cell in cells {
        if cell.get("cell_type")?.as_str()? != "code" {
            continue;
        }
        let source = match cell.get("source")? {
            Value::String(s) => s.clone(),
            Value::Array(lines) => lines
                .iter()
                .map(|line| line.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()?
                .concat(),
            _ => return None,
        };
        blocks.push(source);
    }
    Some(blocks.join("\n\n"))
}

/// Read the header and the first [`PREVIEW_ROWS`] rows and render them as aligned columns.
fn extract_table_preview(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let lines = BufReader::new(file)
        .lines()
        .take(PREVIEW_ROWS + 1)
        .collect::<io::Result<Vec<_>>>()?;
    Ok(render_preview(&lines))
}

/// Render comma-separated rows with every column padded to its widest cell.
pub fn render_preview(lines: &[String]) -> String {
    let rows: Vec<Vec<&str>> = lines
        .iter()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.split(',').map(|cell| cell.trim().trim_matches('"')).collect())
        .collect();

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| format!("{cell:>width$}", width = widths[i]))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

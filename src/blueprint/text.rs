//! Blueprint text interchange (files, clipboard, indented literals)

use std::path::Path;

use thiserror::Error;

use super::normalize_rows;

#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("could not read blueprint file: {0}")]
    Io(#[from] std::io::Error),
    #[error("blueprint contains no rows")]
    Empty,
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Parse blueprint text into rows.
///
/// Line endings are normalized, blank lines at either end are dropped and
/// the smallest common indentation of the non-blank lines is stripped.
pub fn rows_from_text(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let start = lines.iter().position(|l| !is_blank(l));
    let end = lines.iter().rposition(|l| !is_blank(l));
    let (Some(start), Some(end)) = (start, end) else {
        return Vec::new();
    };
    let trimmed = &lines[start..=end];

    let indent = trimmed
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| leading_whitespace(l))
        .min()
        .unwrap_or(0);

    trimmed
        .iter()
        .map(|l| l.chars().skip(indent).collect())
        .collect()
}

/// Render rows as newline-separated text (normalized first).
///
/// A grid with no columns has no cells; it renders as empty text, which
/// `rows_from_text` reads back as no rows.
pub fn text_from_rows<S: AsRef<str>>(rows: &[S]) -> String {
    let rows = normalize_rows(rows);
    if rows.iter().all(|r| r.is_empty()) {
        return String::new();
    }
    rows.join("\n")
}

/// Read a blueprint file into normalized rows
pub fn load_blueprint(path: impl AsRef<Path>) -> Result<Vec<String>, BlueprintError> {
    let text = std::fs::read_to_string(path)?;
    let rows = rows_from_text(&text);
    if rows.is_empty() {
        return Err(BlueprintError::Empty);
    }
    Ok(normalize_rows(&rows))
}

//! Delimited text point sets: one `x y z` row per point, no header.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use regkit_core::PointSet;

use crate::error::{IoError, Result};

/// Read a point file separated by commas, semicolons or whitespace.
///
/// Lines starting with `#` are ignored. Every row must hold exactly three
/// numbers.
pub fn read_point_set(path: &Path) -> Result<PointSet> {
    let text = fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    let (delimiter, text) = normalize_delimiter(&text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|source| IoError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            return Err(IoError::corrupt(
                path,
                format!("row {} has {} columns, expected 3", row + 1, fields.len()),
            ));
        }
        let mut coords = [0.0; 3];
        for (c, field) in fields.iter().enumerate() {
            coords[c] = field
                .parse::<f64>()
                .map_err(|e| IoError::corrupt(path, format!("row {}: '{}': {}", row + 1, field, e)))?;
        }
        rows.push(coords);
    }

    tracing::debug!("Read {} point(s) from {}", rows.len(), path.display());
    Ok(PointSet::from_rows(&rows))
}

/// Pick the delimiter from the first data line. Whitespace-separated input
/// is rewritten with commas so runs of spaces count once.
fn normalize_delimiter(text: &str) -> (u8, String) {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or_default();
    if first.contains(',') {
        (b',', text.to_string())
    } else if first.contains(';') {
        (b';', text.to_string())
    } else {
        let joined = text
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(","))
            .collect::<Vec<_>>()
            .join("\n");
        (b',', joined)
    }
}

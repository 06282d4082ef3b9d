//! CSV reading for code list sources

use std::path::Path;

use super::CodelistError;

/// Read (code, optional category) entries from a CSV source
///
/// Rows with an empty code field are skipped; an empty category field is
/// treated as no category. The whole file is read eagerly so that a
/// malformed source fails the run up front.
pub(super) fn read_entries(
    path: &Path,
    code_column: &str,
    category_column: Option<&str>,
) -> Result<Vec<(String, Option<String>)>, CodelistError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CodelistError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| CodelistError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let code_idx = column_index(&headers, code_column).ok_or_else(|| {
        CodelistError::MissingColumn {
            path: path.to_path_buf(),
            column: code_column.to_string(),
        }
    })?;

    let category_idx = match category_column {
        Some(column) => Some(column_index(&headers, column).ok_or_else(|| {
            CodelistError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            }
        })?),
        None => None,
    };

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| CodelistError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let code = record.get(code_idx).unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }

        let category = category_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);

        entries.push((code.to_string(), category));
    }

    if entries.is_empty() {
        return Err(CodelistError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(entries)
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Option<usize> {
    headers.iter().position(|header| header == column)
}

//! Tabular decoders: CSV/TSV and JSON.
//!
//! CSV delimiter detection prefers tab over comma; whitespace-delimited
//! text bypasses the `csv` crate and tokenizes directly. The first row is
//! a header only when at least one of its tokens fails numeric coercion;
//! otherwise columns get synthetic `Ch1..ChN` names. Cells coerce to
//! numbers per column, with the whole column falling back to text when any
//! cell resists.
//!
//! JSON parses through `serde_json` with no schema validation; the
//! visualization layer adapts to shape. A homogeneous top-level array of
//! objects is projected to named columns, everything else passes through
//! as the raw document.

use log::debug;

use crate::envelope::{Column, ColumnValues, TabularSeries};
use crate::error::DecodeError;
use crate::text::{self, Delimiter};

/// Decode CSV/TSV/whitespace-delimited text into named columns.
pub fn decode_csv(bytes: &[u8]) -> Result<TabularSeries, DecodeError> {
    let content = text::decode_text(bytes);
    let delimiter = text::detect_delimiter(&content);

    let rows: Vec<Vec<String>> = match delimiter.as_byte() {
        Some(byte) => read_delimited(&content, byte)?,
        None => text::non_empty_lines(&content)
            .map(|line| {
                text::split_tokens(line, Delimiter::Whitespace)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect(),
    };

    let Some(first) = rows.first() else {
        return Ok(TabularSeries::Columns(Vec::new()));
    };

    let has_header = first
        .iter()
        .filter(|cell| !cell.is_empty())
        .any(|cell| text::coerce_f64(cell).is_none());

    let (names, data_rows): (Vec<String>, &[Vec<String>]) = if has_header {
        (first.clone(), &rows[1..])
    } else {
        let names = (1..=first.len()).map(|i| format!("Ch{i}")).collect();
        (names, &rows[..])
    };

    let mut cells: Vec<Vec<String>> = vec![Vec::with_capacity(data_rows.len()); names.len()];
    for row in data_rows {
        for (i, cell) in row.iter().enumerate().take(names.len()) {
            cells[i].push(cell.clone());
        }
    }

    // Ragged rows leave shorter columns; clip everything to the shortest
    // so the columns stay row-aligned.
    let min_len = cells.iter().map(Vec::len).min().unwrap_or(0);
    for column in &mut cells {
        column.truncate(min_len);
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column {
            name,
            values: coerce_column(raw),
        })
        .collect();
    Ok(TabularSeries::Columns(columns))
}

/// Read tab/comma-delimited rows with the `csv` crate, tolerating ragged
/// row widths (clipped later).
fn read_delimited(content: &str, delimiter: u8) -> Result<Vec<Vec<String>>, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| DecodeError::malformed(format!("csv parse error: {e}")))?;
        let row: Vec<String> = record.iter().map(|cell| cell.trim().to_string()).collect();
        if row.iter().any(|cell| !cell.is_empty()) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// A column is numeric only when every cell coerces.
fn coerce_column(raw: Vec<String>) -> ColumnValues {
    let mut numeric = Vec::with_capacity(raw.len());
    for cell in &raw {
        match text::coerce_f64(cell) {
            Some(v) => numeric.push(v),
            None => return ColumnValues::Text(raw),
        }
    }
    ColumnValues::Numeric(numeric)
}

/// Decode a JSON document.
pub fn decode_json(bytes: &[u8]) -> Result<TabularSeries, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| DecodeError::malformed(format!("json parse error: {e}")))?;

    if let Some(columns) = project_object_array(&value) {
        debug!("json decode: projected {} columns", columns.len());
        return Ok(TabularSeries::Columns(columns));
    }
    Ok(TabularSeries::Json(value))
}

/// Project a homogeneous array of objects into named columns. Returns
/// `None` for any other shape; those pass through as raw JSON.
fn project_object_array(value: &serde_json::Value) -> Option<Vec<Column>> {
    let array = value.as_array()?;
    let first = array.first()?.as_object()?;
    let keys: Vec<&String> = first.keys().collect();

    let mut columns: Vec<(String, Vec<String>, bool)> = keys
        .iter()
        .map(|k| (k.to_string(), Vec::with_capacity(array.len()), true))
        .collect();

    for item in array {
        let object = item.as_object()?;
        for (name, cells, numeric) in &mut columns {
            let cell = object.get(name.as_str())?;
            match cell {
                serde_json::Value::Number(n) => cells.push(n.to_string()),
                serde_json::Value::String(s) => {
                    *numeric = false;
                    cells.push(s.clone());
                }
                serde_json::Value::Bool(b) => {
                    *numeric = false;
                    cells.push(b.to_string());
                }
                other => {
                    *numeric = false;
                    cells.push(other.to_string());
                }
            }
        }
    }

    Some(
        columns
            .into_iter()
            .map(|(name, cells, numeric)| Column {
                name,
                values: if numeric {
                    coerce_column(cells)
                } else {
                    ColumnValues::Text(cells)
                },
            })
            .collect(),
    )
}

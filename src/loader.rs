use crate::error::{AnalysisError, InputErrorKind, Result};
use crate::types::{RawRow, RawTable, RawValue};
use csv::ReaderBuilder;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
    /// Rows dropped by the `max_rows` cap.
    pub truncated_rows: usize,
}

/// Read an exported recommendation table from disk.
///
/// `.csv` and `.tsv` go through the `csv` reader, `.json` must hold an array
/// of objects. Rows past `max_rows` are dropped before analysis.
pub fn load_table(path: &Path, max_rows: Option<usize>) -> Result<(RawTable, LoadReport)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let file = std::fs::File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let (mut table, mut report) = match ext.as_str() {
        "csv" => read_delimited(file, b',')?,
        "tsv" => read_delimited(file, b'\t')?,
        "json" => read_json(file)?,
        other => {
            return Err(AnalysisError::unreadable(
                path.display().to_string(),
                InputErrorKind::UnsupportedFormat(other.to_string()),
            ))
        }
    };

    if let Some(limit) = max_rows {
        if table.rows.len() > limit {
            report.truncated_rows = table.rows.len() - limit;
            table.rows.truncate(limit);
            tracing::warn!(
                limit,
                dropped = report.truncated_rows,
                "export exceeds row cap; extra rows ignored"
            );
        }
    }
    report.kept_rows = table.rows.len();
    tracing::info!(
        path = %path.display(),
        rows = report.kept_rows,
        columns = table.columns.len(),
        "loaded export"
    );
    Ok((table, report))
}

/// Parse delimited text. Row-level decode failures are counted and skipped;
/// an unreadable header line is fatal.
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<(RawTable, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();

    let mut report = LoadReport::default();
    let mut records: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        match result {
            Ok(rec) => {
                if rec.iter().all(|cell| cell.trim().is_empty()) {
                    // trailing blank lines in spreadsheet exports
                    report.total_rows -= 1;
                    continue;
                }
                records.push(rec.iter().map(String::from).collect());
            }
            Err(e) => {
                tracing::debug!("skipping unreadable row {}: {e}", report.total_rows);
                report.parse_errors += 1;
            }
        }
    }
    if report.parse_errors > 0 {
        tracing::warn!(count = report.parse_errors, "rows skipped due to decode errors");
    }
    Ok((RawTable::from_records(&headers, records), report))
}

/// Parse a JSON array of flat objects.
pub fn read_json<R: Read>(reader: R) -> Result<(RawTable, LoadReport)> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        return Err(AnalysisError::unreadable(
            "JSON export",
            InputErrorKind::InvalidJson("expected an array of objects".to_string()),
        ));
    };
    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(AnalysisError::unreadable(
                "JSON export",
                InputErrorKind::InvalidJson(format!("element {i} is not an object")),
            ));
        };
        let row: RawRow = fields
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), json_cell(v)))
            .collect();
        rows.push(row);
    }
    let report = LoadReport {
        total_rows: rows.len(),
        ..LoadReport::default()
    };
    Ok((RawTable::from_rows(rows), report))
}

fn json_cell(v: Value) -> RawValue {
    match v {
        Value::Null => RawValue::Empty,
        Value::String(s) => RawValue::from(s),
        Value::Number(n) => n.as_f64().map_or(RawValue::Empty, RawValue::Number),
        Value::Bool(b) => RawValue::Text(b.to_string()),
        other => RawValue::Text(other.to_string()),
    }
}

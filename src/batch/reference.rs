use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::similarity::parse_numeric;

/// Reference measurements keyed by object id.
///
/// Rows come from a JSON array of objects or from a CSV file with a header
/// line. When an id appears more than once the first row wins.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: HashMap<String, Map<String, Value>>,
    duplicates: Vec<String>,
    duplicate_rows: usize,
}

/// Canonical string form of an id cell: strings as-is, numbers in decimal,
/// anything else empty.
pub fn id_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

impl ReferenceTable {
    /// Load a table, as CSV when the extension is `.csv` and as JSON otherwise.
    pub fn load(path: &Path, id_column: &str) -> Result<Self> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let rows = if is_csv {
            read_csv_rows(path, id_column)?
        } else {
            let file = File::open(path).with_context(|| {
                format!("Failed to open reference table at {}", path.display())
            })?;
            serde_json::from_reader(BufReader::new(file)).with_context(|| {
                format!("Failed to parse reference table at {}", path.display())
            })?
        };
        Ok(Self::from_rows(rows, id_column))
    }

    pub fn from_rows(rows: Vec<Value>, id_column: &str) -> Self {
        let mut table = ReferenceTable::default();
        for row in rows {
            let Value::Object(row) = row else { continue };
            let id = id_string(row.get(id_column));
            if id.is_empty() {
                continue;
            }
            if table.rows.contains_key(&id) {
                table.duplicate_rows += 1;
                if !table.duplicates.contains(&id) {
                    table.duplicates.push(id);
                }
                continue;
            }
            table.rows.insert(id, row);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct ids that appeared more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicates
    }

    /// Number of rows dropped because their id was already present.
    pub fn duplicate_rows(&self) -> usize {
        self.duplicate_rows
    }

    pub fn row(&self, id: &str) -> Option<&Map<String, Value>> {
        self.rows.get(id)
    }

    /// Numeric cell, `None` when the row or cell is missing or unparseable.
    pub fn value(&self, id: &str, column: &str) -> Option<f64> {
        self.row(id)
            .and_then(|row| row.get(column))
            .and_then(|v| parse_numeric(v).ok().flatten())
    }

    /// Replace missing or unparseable cells in `columns` by the column median.
    ///
    /// Columns without a single numeric cell are left untouched. Returns the
    /// number of cells filled.
    pub fn impute_medians(&mut self, columns: &[&str]) -> usize {
        let mut filled = 0;
        for column in columns {
            let values: Vec<f64> = self
                .rows
                .values()
                .filter_map(|row| row.get(*column))
                .filter_map(|v| parse_numeric(v).ok().flatten())
                .collect();
            let Some(median) = median(values) else { continue };

            for row in self.rows.values_mut() {
                let present = row
                    .get(*column)
                    .map(|v| matches!(parse_numeric(v), Ok(Some(_))))
                    .unwrap_or(false);
                if !present {
                    row.insert(column.to_string(), Value::from(median));
                    filled += 1;
                }
            }
        }
        filled
    }
}

/// Read CSV rows as JSON objects keyed by the header line.
fn read_csv_rows(path: &Path, id_column: &str) -> Result<Vec<Value>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open reference table at {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| {
            format!("Failed to parse row {} of {}", line + 1, path.display())
        })?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), csv_cell(cell, header == id_column)))
            .collect();
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

/// Numbers become JSON numbers and empty or NaN cells become null.
/// Ids and anything unparseable stay strings.
fn csv_cell(cell: &str, is_id: bool) -> Value {
    let text = Value::String(cell.trim().to_string());
    if is_id {
        return text;
    }
    match parse_numeric(&text) {
        Ok(Some(v)) => Value::from(v),
        Ok(None) => Value::Null,
        Err(_) => text,
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

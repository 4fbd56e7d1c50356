use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::report::{OrgRecord, PeriodReport, Totals};
use crate::schema::{Field, SCHEMA_WIDTH};

/// A single cell as delivered by the sheet source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

/// One source row inside the fetched window. Trailing blank cells are
/// usually omitted by the source, so rows may be shorter than the schema.
pub type RawRow = Vec<CellValue>;

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::String(s) => CellValue::Text(s),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
            Value::Bool(b) => CellValue::Bool(b),
            Value::Array(_) | Value::Object(_) => CellValue::Empty,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl CellValue {
    /// Trimmed textual form of the cell.
    pub fn text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{n:.0}"),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Coerce a counter cell to a non-negative integer.
///
/// Blank cells, junk text, negative and non-finite values all become 0.
/// Spaces (including non-breaking ones used as thousands separators) are
/// removed and a comma is read as the decimal point; the result is
/// truncated toward zero.
pub fn sanitize_count(cell: &CellValue) -> u64 {
    match cell {
        CellValue::Empty | CellValue::Bool(_) => 0,
        CellValue::Number(n) => truncate_count(*n),
        CellValue::Text(s) => sanitize_text(s),
    }
}

fn sanitize_text(raw: &str) -> u64 {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if compact.is_empty() {
        return 0;
    }

    compact.parse::<f64>().map(truncate_count).unwrap_or(0)
}

fn truncate_count(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    // `as` saturates on overflow
    value.trunc() as u64
}

/// Whether a raw row becomes a record: it must have a non-blank first cell.
fn is_admitted(row: &RawRow) -> bool {
    row.get(Field::Organization.position())
        .is_some_and(|cell| !cell.is_blank())
}

/// Pad with blanks and cut to exactly the schema width.
fn fit_to_schema(row: &RawRow) -> Vec<CellValue> {
    row.iter()
        .cloned()
        .chain(std::iter::repeat(CellValue::Empty))
        .take(SCHEMA_WIDTH)
        .collect()
}

fn to_record(cells: &[CellValue]) -> OrgRecord {
    let count = |field: Field| sanitize_count(&cells[field.position()]);
    OrgRecord {
        organization: cells[Field::Organization.position()].text(),
        total: count(Field::Total),
        closed: count(Field::Closed),
        open: count(Field::Open),
        cancelled: count(Field::Cancelled),
        erroneous: count(Field::Erroneous),
    }
}

/// Turn the raw rows of one period into records and totals.
///
/// Total over any input: irregular content is coerced, never rejected.
/// Source order is kept.
#[instrument(skip(rows), fields(row_count = rows.len()))]
pub fn normalize(rows: &[RawRow]) -> PeriodReport {
    let mut totals = Totals::default();
    let records: Vec<OrgRecord> = rows
        .iter()
        .filter(|row| is_admitted(row))
        .map(|row| to_record(&fit_to_schema(row)))
        .inspect(|record| totals.add(record))
        .collect();

    let dropped = rows.len() - records.len();
    if dropped > 0 {
        debug!("Dropped {} blank or unnamed rows out of {}", dropped, rows.len());
    }
    debug!(
        "Normalized {} records, total requests: {}",
        records.len(),
        totals.total
    );

    PeriodReport { records, totals }
}

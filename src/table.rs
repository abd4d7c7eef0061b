use crate::errors::DashboardError;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const DURATION_COLUMN: &str = "duration_hours";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Sleep,
    Workout,
}

impl RecordKind {
    fn timestamp_columns(self) -> &'static [&'static str] {
        match self {
            RecordKind::Sleep => &["start", "end"],
            RecordKind::Workout => &["start"],
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Sleep => f.write_str("sleep"),
            RecordKind::Workout => f.write_str("workout"),
        }
    }
}

/// A single flattened value. `Missing` marks a path absent from a record (or
/// explicitly null) and is never coerced to zero or an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Arrays are kept whole rather than expanded into further columns.
    List(Vec<Value>),
    Timestamp(DateTime<FixedOffset>),
}

impl Cell {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::Bool(flag) => Cell::Bool(*flag),
            Value::Number(number) => Cell::Number(number.clone()),
            Value::String(text) => Cell::Text(text.clone()),
            Value::Array(items) => Cell::List(items.clone()),
            // Objects are expanded by `flatten_object` and never land in a cell.
            Value::Object(_) => Cell::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(number) => number.as_f64(),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Cell::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Missing => serializer.serialize_none(),
            Cell::Bool(flag) => serializer.serialize_bool(*flag),
            Cell::Number(number) => number.serialize(serializer),
            Cell::Text(text) => serializer.serialize_str(text),
            Cell::List(items) => items.serialize(serializer),
            Cell::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => f.write_str("null"),
            Cell::Bool(flag) => write!(f, "{flag}"),
            Cell::Number(number) => write!(f, "{number}"),
            Cell::Text(text) => f.write_str(text),
            Cell::List(items) => write!(f, "{}", Value::Array(items.clone())),
            Cell::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

/// Column-aligned table: every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl FlatTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Cell> {
        let index = self.column_index(name)?;
        self.rows.get(row).map(|cells| &cells[index])
    }

    pub fn head(&self, count: usize) -> FlatTable {
        FlatTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(count).cloned().collect(),
        }
    }

    fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }
}

/// Flattens vendor records into a table with dot-joined column names.
///
/// Columns appear in first-seen order across the collection. Timestamp columns
/// (`start`, plus `end` for sleep) are parsed; one bad timestamp fails the
/// whole collection. Sleep tables gain a `duration_hours` column. A record
/// where two paths flatten to the same name (a literal `"a.b"` key next to
/// `{"a": {"b": ..}}`) is rejected rather than letting one value win.
pub fn flatten(records: &[Value], kind: RecordKind) -> Result<FlatTable, DashboardError> {
    if records.is_empty() {
        return Ok(FlatTable::default());
    }

    let mut table = FlatTable::default();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut flattened = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(DashboardError::DataFormat(format!(
                "{kind} record {row} is not a JSON object"
            )));
        };

        let mut cells = Vec::new();
        flatten_object("", fields, &mut cells);

        {
            let mut names = HashSet::with_capacity(cells.len());
            if let Some((name, _)) = cells.iter().find(|(name, _)| !names.insert(name.as_str())) {
                return Err(DashboardError::DataFormat(format!(
                    "{kind} record {row} has two fields flattening to '{name}'"
                )));
            }
        }

        for (name, _) in &cells {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), table.columns.len());
                table.columns.push(name.clone());
            }
        }
        flattened.push(cells);
    }

    for cells in flattened {
        let mut row = vec![Cell::Missing; table.columns.len()];
        for (name, cell) in cells {
            if let Some(&index) = positions.get(&name) {
                row[index] = cell;
            }
        }
        table.rows.push(row);
    }

    parse_timestamps(&mut table, kind)?;
    if kind == RecordKind::Sleep {
        append_duration(&mut table);
    }

    Ok(table)
}

fn flatten_object(prefix: &str, fields: &Map<String, Value>, out: &mut Vec<(String, Cell)>) {
    for (key, value) in fields {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_object(&name, inner, out),
            other => out.push((name, Cell::from_json(other))),
        }
    }
}

fn parse_timestamps(table: &mut FlatTable, kind: RecordKind) -> Result<(), DashboardError> {
    for &column in kind.timestamp_columns() {
        let Some(index) = table.column_index(column) else {
            return Err(DashboardError::DataFormat(format!(
                "{kind} records have no '{column}' field"
            )));
        };

        for (row, cells) in table.rows.iter_mut().enumerate() {
            let parsed = match &cells[index] {
                Cell::Missing | Cell::Timestamp(_) => continue,
                Cell::Text(raw) => parse_timestamp(raw).ok_or_else(|| {
                    DashboardError::DataFormat(format!(
                        "{kind} record {row}: '{column}' value '{raw}' is not a timestamp"
                    ))
                })?,
                other => {
                    return Err(DashboardError::DataFormat(format!(
                        "{kind} record {row}: '{column}' value {other} is not a timestamp"
                    )));
                }
            };
            cells[index] = Cell::Timestamp(parsed);
        }
    }
    Ok(())
}

/// Accepts RFC 3339 timestamps; offset-less ones are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

fn append_duration(table: &mut FlatTable) {
    let (Some(start), Some(end)) = (table.column_index("start"), table.column_index("end")) else {
        return;
    };
    let values = table
        .rows
        .iter()
        .map(|row| match (row[start].as_timestamp(), row[end].as_timestamp()) {
            (Some(from), Some(to)) => duration_hours(from, to),
            _ => Cell::Missing,
        })
        .collect();
    table.set_column(DURATION_COLUMN, values);
}

/// Negative spans are passed through untouched.
fn duration_hours(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> Cell {
    let seconds = (*end - *start).num_milliseconds() as f64 / 1000.0;
    Number::from_f64(seconds / 3600.0)
        .map(Cell::Number)
        .unwrap_or(Cell::Missing)
}

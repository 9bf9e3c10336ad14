use chrono::{DateTime, Local};
use std::path::PathBuf;

use super::format::format_number;
use super::frame::Frame;

/// A single decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Time(DateTime<Local>),
    Text(String),
    Missing,
}

impl Cell {
    /// Numeric view of the cell. Timestamps become seconds since the Unix epoch.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Time(t) => Some(t.timestamp_millis() as f64 / 1000.0),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// One named field of a decoded record, before column names are formatted
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub name: String,
    pub value: Cell,
    pub units: String,
}

impl RawField {
    pub fn new(name: impl Into<String>, value: Cell, units: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            units: units.into(),
        }
    }
}

/// A decoded `record` message
pub type RawRecord = Vec<RawField>;

/// What a column holds, judged by its first non-missing cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Time,
    Numeric,
    Text,
    Empty,
}

impl ColumnKind {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Time => "time",
            ColumnKind::Numeric => "number",
            ColumnKind::Text => "text",
            ColumnKind::Empty => "empty",
        }
    }
}

/// A loaded activity file
#[derive(Debug, Clone)]
pub struct Activity {
    pub path: PathBuf,
    pub frame: Frame,
}

impl Activity {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FitFileEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    /// Modification time in milliseconds since the Unix epoch
    pub modified: u64,
}

pub fn value_to_string(v: &Cell) -> String {
    match v {
        Cell::Number(n) => format_number(*n),
        Cell::Time(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        Cell::Text(s) => s.clone(),
        Cell::Missing => "-".to_string(),
    }
}

use std::collections::HashMap;

use super::model::{Cell, ColumnKind, RawRecord};

/// Prefix the decoder uses for fields missing from the FIT profile
const UNKNOWN_PREFIX: &str = "Unknown";

static MISSING: Cell = Cell::Missing;

/// `heart_rate` -> `Heart Rate`
pub fn format_column_name(raw: &str) -> String {
    raw.split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Rectangular table of decoded records, one column per field name
#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    units: HashMap<String, String>,
}

impl Frame {
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut units: HashMap<String, String> = HashMap::new();

        // Column order follows first appearance across all records
        let mut indexed: Vec<Vec<(usize, Cell)>> = Vec::with_capacity(records.len());
        for record in records {
            let mut fields = Vec::with_capacity(record.len());
            for field in record {
                let name = format_column_name(&field.name);
                let idx = match index.get(&name) {
                    Some(&idx) => idx,
                    None => {
                        columns.push(name.clone());
                        index.insert(name.clone(), columns.len() - 1);
                        columns.len() - 1
                    }
                };
                let unit = units.entry(name).or_default();
                if !field.units.is_empty() {
                    *unit = field.units;
                }
                fields.push((idx, field.value));
            }
            indexed.push(fields);
        }

        let width = columns.len();
        let rows = indexed
            .into_iter()
            .map(|fields| {
                let mut row = vec![Cell::Missing; width];
                for (idx, value) in fields {
                    row[idx] = value;
                }
                row
            })
            .collect();

        Self {
            columns,
            rows,
            units,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns offered for plotting: everything except undocumented fields
    pub fn available_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.starts_with(UNKNOWN_PREFIX))
            .cloned()
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Units for a column, empty when the decoder gave none
    pub fn units(&self, name: &str) -> &str {
        self.units.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&MISSING)
    }

    pub fn values(&self, col: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| row.get(col).unwrap_or(&MISSING))
    }

    pub fn numeric_values(&self, col: usize) -> Vec<Option<f64>> {
        self.values(col).map(Cell::as_f64).collect()
    }

    pub fn column_kind(&self, col: usize) -> ColumnKind {
        match self.values(col).find(|c| !c.is_missing()) {
            Some(Cell::Time(_)) => ColumnKind::Time,
            Some(Cell::Number(_)) => ColumnKind::Numeric,
            Some(Cell::Text(_)) => ColumnKind::Text,
            _ => ColumnKind::Empty,
        }
    }

    pub fn first_value(&self, col: usize) -> Option<&Cell> {
        self.values(col).find(|c| !c.is_missing())
    }
}

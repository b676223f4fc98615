use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde_json::Value;

use crate::UtcDateTime;

/// One cell of a [`Table`].
///
/// `Absent` marks "column not present for this row" and is distinct from
/// `Null`, which is an explicit null supplied by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Absent,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(UtcDateTime),
    Json(Value),
}

impl CellValue {
    /// Maps a raw JSON value onto a cell, keeping the source type.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) => Self::Int(int),
                None => Self::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => Self::Text(text.clone()),
            other => Self::Json(other.clone()),
        }
    }

    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Declared type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Parsed UTC timestamps.
    Timestamp,
    /// Dictionary-encoded strings with a small repeated value set.
    Categorical,
    /// Values kept as delivered by the server.
    Raw,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Timestamp => "timestamp",
            Self::Categorical => "categorical",
            Self::Raw => "raw",
        })
    }
}

/// Cell slot for typed column storage.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot<T> {
    Absent,
    Null,
    Value(T),
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnData {
    Timestamp(Vec<Slot<UtcDateTime>>),
    Categorical {
        dictionary: Vec<String>,
        codes: Vec<Slot<u32>>,
    },
    Values(Vec<CellValue>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            Self::Timestamp(slots) => slots.len(),
            Self::Categorical { codes, .. } => codes.len(),
            Self::Values(cells) => cells.len(),
        }
    }
}

/// A single named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        match &self.data {
            ColumnData::Timestamp(_) => ColumnType::Timestamp,
            ColumnData::Categorical { .. } => ColumnType::Categorical,
            ColumnData::Values(_) => ColumnType::Raw,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct values backing a categorical column, in first-seen order.
    pub fn dictionary(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Categorical { dictionary, .. } => Some(dictionary),
            _ => None,
        }
    }

    /// The decoded cell at `row`. Categorical cells decode back to text.
    pub fn cell(&self, row: usize) -> Option<CellValue> {
        match &self.data {
            ColumnData::Timestamp(slots) => slots.get(row).map(|slot| match slot {
                Slot::Absent => CellValue::Absent,
                Slot::Null => CellValue::Null,
                Slot::Value(ts) => CellValue::Timestamp(*ts),
            }),
            ColumnData::Categorical { dictionary, codes } => {
                codes.get(row).map(|slot| match slot {
                    Slot::Absent => CellValue::Absent,
                    Slot::Null => CellValue::Null,
                    Slot::Value(code) => CellValue::Text(dictionary[*code as usize].clone()),
                })
            }
            ColumnData::Values(cells) => cells.get(row).cloned(),
        }
    }
}

/// Immutable columnar table produced by row normalization.
///
/// Every column holds exactly one slot per row; rows that lacked a column
/// carry [`CellValue::Absent`] in it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// A table with no rows and no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Convenience accessor for one decoded cell.
    pub fn cell(&self, row: usize, column: &str) -> Option<CellValue> {
        self.column(column)?.cell(row)
    }
}

/// Incremental column-major builder used by the normalization passes.
#[derive(Debug, Default)]
pub(crate) struct TableBuilder {
    columns: Vec<Column>,
    rows: usize,
}

impl TableBuilder {
    pub(crate) fn with_rows(rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            rows,
        }
    }

    pub(crate) fn push_timestamp_column(
        &mut self,
        name: impl Into<String>,
        slots: Vec<Slot<UtcDateTime>>,
    ) {
        debug_assert_eq!(slots.len(), self.rows);
        self.columns.push(Column {
            name: name.into(),
            data: ColumnData::Timestamp(slots),
        });
    }

    pub(crate) fn push_categorical_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Slot<String>>,
    ) {
        debug_assert_eq!(values.len(), self.rows);
        let mut dictionary = Vec::new();
        let mut lookup: HashMap<String, u32> = HashMap::new();
        let codes = values
            .into_iter()
            .map(|value| match value {
                Slot::Absent => Slot::Absent,
                Slot::Null => Slot::Null,
                Slot::Value(text) => {
                    let code = *lookup.entry(text.clone()).or_insert_with(|| {
                        dictionary.push(text);
                        (dictionary.len() - 1) as u32
                    });
                    Slot::Value(code)
                }
            })
            .collect();
        self.columns.push(Column {
            name: name.into(),
            data: ColumnData::Categorical { dictionary, codes },
        });
    }

    pub(crate) fn push_raw_column(&mut self, name: impl Into<String>, cells: Vec<CellValue>) {
        debug_assert_eq!(cells.len(), self.rows);
        self.columns.push(Column {
            name: name.into(),
            data: ColumnData::Values(cells),
        });
    }

    pub(crate) fn finish(self) -> Table {
        Table {
            columns: self.columns,
            rows: self.rows,
        }
    }
}

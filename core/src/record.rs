//! Coefficient records decoded from the color table.
//!
//! # Design
//! The query API returns a row as `[[{"Name", "Type", "Value"}, ...]]` with
//! every value as text. `ColorRecord::from_rows` decodes that shape into an
//! insertion-ordered map so the formatter can emit functions in the order
//! the table stores them.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const ID_FIELD: &str = "id";
pub const LOSS_FIELD: &str = "loss";

/// A single numeric column value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coefficient {
    Integer(i64),
    Float(f64),
}

impl Coefficient {
    pub fn is_zero(self) -> bool {
        match self {
            Coefficient::Integer(v) => v == 0,
            Coefficient::Float(v) => v == 0.0,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Coefficient::Integer(v) => v as f64,
            Coefficient::Float(v) => v,
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficient::Integer(v) => write!(f, "{v}"),
            Coefficient::Float(v) => write!(f, "{v}"),
        }
    }
}

/// One `{Name, Type, Value}` cell of a result row.
#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub kind: i64,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Filter coefficients for one color, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColorRecord {
    fields: IndexMap<String, Coefficient>,
}

impl ColorRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the first row of a query payload.
    ///
    /// Returns `Ok(None)` when the payload holds no rows.
    pub fn from_rows(payload: &serde_json::Value) -> Result<Option<Self>, ApiError> {
        let rows = Vec::<Vec<Cell>>::deserialize(payload)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        Self::from_cells(row).map(Some)
    }

    /// Build a record from the cells of one row. `loss` is parsed as a
    /// float, every other column as an integer.
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Result<Self, ApiError> {
        let mut record = Self::new();
        for cell in cells {
            let value = parse_cell(&cell)?;
            record.insert(cell.name, value);
        }
        Ok(record)
    }

    /// Set `name` to `value`. A repeated name overwrites the earlier value
    /// and keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: Coefficient) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Coefficient> {
        self.fields.get(name).copied()
    }

    /// The color's 24-bit id, when the row carried one.
    pub fn id(&self) -> Option<i64> {
        match self.get(ID_FIELD)? {
            Coefficient::Integer(v) => Some(v),
            Coefficient::Float(_) => None,
        }
    }

    pub fn loss(&self) -> Option<f64> {
        self.get(LOSS_FIELD).map(Coefficient::as_f64)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Coefficient)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, Coefficient)> for ColorRecord {
    fn from_iter<I: IntoIterator<Item = (K, Coefficient)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

fn parse_cell(cell: &Cell) -> Result<Coefficient, ApiError> {
    let text = cell.value.trim();
    let parsed = if cell.name == LOSS_FIELD {
        text.parse::<f64>().ok().map(Coefficient::Float)
    } else {
        text.parse::<i64>().ok().map(Coefficient::Integer)
    };
    parsed.ok_or_else(|| {
        ApiError::MalformedResponse(format!(
            "column {:?} has non-numeric value {:?}",
            cell.name, cell.value
        ))
    })
}

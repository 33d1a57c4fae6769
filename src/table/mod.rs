use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::TableError;
use crate::models::Record;

/// A single value as delivered by the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// NaN counts as missing, the same as an absent value.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::Bool(b) => Cell::Int(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(v) => Cell::Int(v),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Missing),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Ordering used for join keys: numbers, then text, then missing.
    fn key_cmp(&self, other: &Cell) -> Ordering {
        fn rank(cell: &Cell) -> u8 {
            match cell {
                _ if cell.is_missing() => 2,
                Cell::Text(_) => 1,
                _ => 0,
            }
        }

        match (self, other) {
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => rank(self).cmp(&rank(other)),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Inferred type: any text makes an object column, any float among the
    /// numbers makes a float column.
    pub fn column_type(&self) -> ColumnType {
        let mut ty = ColumnType::Int;
        for cell in &self.values {
            match cell {
                Cell::Text(_) => return ColumnType::Text,
                Cell::Float(_) => ty = ColumnType::Float,
                Cell::Int(_) | Cell::Missing => {}
            }
        }
        ty
    }

    fn take(&self, rows: &[Option<usize>]) -> Vec<Cell> {
        rows.iter()
            .map(|row| row.map_or(Cell::Missing, |i| self.values[i].clone()))
            .collect()
    }
}

/// Season-level statistics: named columns, one row per team or player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatTable {
    columns: Vec<Column>,
    rows: usize,
}

impl StatTable {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map_or(0, |c| c.values.len());
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
            if column.values.len() != rows {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: rows,
                    found: column.values.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table from row objects. Columns appear in first-seen order and
    /// keys absent from a row become missing cells.
    pub fn from_records(records: &[serde_json::Map<String, Value>]) -> Self {
        let mut names: Vec<&String> = Vec::new();
        let mut seen = HashSet::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    names.push(key);
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let values = records
                    .iter()
                    .map(|r| r.get(name).map_or(Cell::Missing, Cell::from_json))
                    .collect();
                Column::new(name.clone(), values)
            })
            .collect();

        Self {
            columns,
            rows: records.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Renames columns; names not present are ignored.
    pub fn rename(mut self, mapping: &[(&str, &str)]) -> Result<Self, TableError> {
        for column in &mut self.columns {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == column.name) {
                column.name = (*to).to_string();
            }
        }
        Self::new(self.columns)
    }

    /// Keeps rows whose value in `column` is at least `threshold`. Rows with a
    /// missing value never pass.
    pub fn filter_at_least(&self, column: &str, threshold: f64) -> Result<Self, TableError> {
        let col = self.column(column)?;
        if col.column_type() == ColumnType::Text {
            return Err(TableError::NonNumericColumn(column.to_string()));
        }

        let keep: Vec<Option<usize>> = col
            .values
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.as_f64().is_some_and(|v| v >= threshold))
            .map(|(i, _)| Some(i))
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.take(&keep)))
            .collect();

        Ok(Self {
            columns,
            rows: keep.len(),
        })
    }

    /// Full outer join on `on`. Keys from both sides are kept and sorted; the
    /// side without a match is filled with missing cells. Other columns that
    /// exist on both sides get `_x` / `_y` suffixes.
    pub fn outer_merge(left: &StatTable, right: &StatTable, on: &str) -> Result<Self, TableError> {
        let left_key = left.column(on)?;
        let right_key = right.column(on)?;

        let mut keys: Vec<&Cell> = left_key.values.iter().chain(&right_key.values).collect();
        keys.sort_by(|a, b| a.key_cmp(b));
        keys.dedup_by(|a, b| a.key_cmp(*b) == Ordering::Equal);

        let matching = |column: &Column, key: &Cell| -> Vec<usize> {
            column
                .values
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.key_cmp(key) == Ordering::Equal)
                .map(|(i, _)| i)
                .collect()
        };

        let mut left_rows = Vec::new();
        let mut right_rows = Vec::new();
        let mut key_values = Vec::new();
        for key in keys {
            let l = matching(left_key, key);
            let r = matching(right_key, key);
            let l: Vec<Option<usize>> = if l.is_empty() { vec![None] } else { l.into_iter().map(Some).collect() };
            let r: Vec<Option<usize>> = if r.is_empty() { vec![None] } else { r.into_iter().map(Some).collect() };
            for li in &l {
                for ri in &r {
                    left_rows.push(*li);
                    right_rows.push(*ri);
                    key_values.push(key.clone());
                }
            }
        }

        let left_names: HashSet<&str> = left.columns.iter().map(|c| c.name.as_str()).collect();
        let right_names: HashSet<&str> = right.columns.iter().map(|c| c.name.as_str()).collect();

        let mut columns = Vec::with_capacity(left.columns.len() + right.columns.len());
        for column in &left.columns {
            if column.name == on {
                columns.push(Column::new(on, key_values.clone()));
            } else if right_names.contains(column.name.as_str()) {
                columns.push(Column::new(format!("{}_x", column.name), column.take(&left_rows)));
            } else {
                columns.push(Column::new(column.name.clone(), column.take(&left_rows)));
            }
        }
        for column in right.columns.iter().filter(|c| c.name != on) {
            if left_names.contains(column.name.as_str()) {
                columns.push(Column::new(format!("{}_y", column.name), column.take(&right_rows)));
            } else {
                columns.push(Column::new(column.name.clone(), column.take(&right_rows)));
            }
        }

        Self::new(columns)
    }

    /// Converts the table into JSON-safe records.
    ///
    /// Float columns whose present values are all whole numbers are emitted as
    /// integers. Type decisions are made first; only then are missing values
    /// replaced with a zero of the column's final type.
    pub fn to_records(&self) -> Result<Vec<Record>, TableError> {
        let mut records = vec![Record::new(); self.rows];
        for column in &self.columns {
            let values = normalize_column(column)?;
            for (record, value) in records.iter_mut().zip(values) {
                record.insert(column.name.clone(), value);
            }
        }
        Ok(records)
    }
}

fn normalize_column(column: &Column) -> Result<Vec<Value>, TableError> {
    let non_finite = || TableError::NonFiniteValue {
        column: column.name.clone(),
    };
    let float = |v: f64| Number::from_f64(v).map(Value::Number).ok_or_else(non_finite);

    match column.column_type() {
        ColumnType::Int => Ok(column
            .values
            .iter()
            .map(|cell| match cell {
                Cell::Int(v) => Value::from(*v),
                _ => Value::from(0),
            })
            .collect()),
        ColumnType::Float if is_integral(column) => Ok(column
            .values
            .iter()
            .map(|cell| match cell.as_f64() {
                Some(v) => Value::from(v as i64),
                None => Value::from(0),
            })
            .collect()),
        ColumnType::Float => column
            .values
            .iter()
            .map(|cell| match cell.as_f64() {
                Some(v) => float(v),
                None => Ok(Value::from(0.0)),
            })
            .collect(),
        ColumnType::Text => column
            .values
            .iter()
            .map(|cell| match cell {
                Cell::Int(v) => Ok(Value::from(*v)),
                Cell::Float(v) if !v.is_nan() => float(*v),
                Cell::Text(s) => Ok(Value::String(s.clone())),
                _ => Ok(Value::from(0)),
            })
            .collect(),
    }
}

fn is_integral(column: &Column) -> bool {
    const LIMIT: f64 = 9_223_372_036_854_775_807.0;
    column
        .values
        .iter()
        .filter_map(Cell::as_f64)
        .all(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < LIMIT)
}

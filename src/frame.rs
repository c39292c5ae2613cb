//! Column-oriented in-memory table.
//!
//! A [`Frame`] is an ordered list of named [`Column`]s that all share one
//! height. Cells are `Option<Value>`; `None` is a null. Nothing here assumes a
//! fixed schema: every lookup is by name and returns an `Option`, which is
//! what lets the pipeline degrade to defaults when a source file omits a
//! column.

use std::collections::{HashMap, HashSet};

use anyhow::{Result, anyhow};
use log::{debug, warn};

use crate::{
    data::{Value, parse_typed_value},
    error::PipelineError,
    schema::infer_column_type,
};

pub type Cell = Option<Value>;

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

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row).and_then(|cell| cell.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    height: usize,
}

impl Frame {
    /// Zero rows, zero columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a frame from raw CSV text, inferring one type per column.
    pub fn from_records(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut columns = Vec::with_capacity(headers.len());
        for (idx, name) in headers.into_iter().enumerate() {
            let raw = rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""));
            let ty = infer_column_type(raw.clone());
            let values = raw
                .map(|cell| parse_typed_value(cell, &ty))
                .collect::<Result<Vec<_>>>()?;
            columns.push(Column { name, values });
        }
        Self::from_columns(columns)
    }

    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map(|c| c.values.len()).unwrap_or(0);
        for column in &columns {
            if column.values.len() != height {
                return Err(PipelineError::LengthMismatch {
                    column: column.name.clone(),
                    expected: height,
                    actual: column.values.len(),
                }
                .into());
            }
        }
        Ok(Self { columns, height })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// No rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.columns.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Replaces the named column in place, or appends it. A frame without
    /// columns adopts the new column's height.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) -> Result<()> {
        if self.columns.is_empty() {
            self.height = values.len();
        } else if values.len() != self.height {
            return Err(PipelineError::LengthMismatch {
                column: name.to_string(),
                expected: self.height,
                actual: values.len(),
            }
            .into());
        }
        match self.column_mut(name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
        Ok(())
    }

    pub fn rename_columns<F>(&mut self, mut rename: F)
    where
        F: FnMut(&str) -> String,
    {
        for column in &mut self.columns {
            column.name = rename(&column.name);
        }
    }

    /// Renames `from` to `to`; returns false when `from` does not exist.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.column_mut(from) {
            Some(column) => {
                column.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Rewrites every non-null cell of a column with `map`.
    pub fn map_column<F>(&mut self, name: &str, mut map: F) -> bool
    where
        F: FnMut(&Value) -> Value,
    {
        let Some(column) = self.column_mut(name) else {
            return false;
        };
        for cell in column.values.iter_mut().flatten() {
            *cell = map(&*cell);
        }
        true
    }

    /// First column, in column order, whose lowercased name contains any of
    /// `needles`.
    pub fn find_column(&self, needles: &[&str]) -> Option<&str> {
        let found = self.columns.iter().find(|column| {
            let lowered = column.name.to_lowercase();
            needles
                .iter()
                .any(|needle| lowered.contains(&needle.to_lowercase()))
        });
        match found {
            Some(column) => {
                debug!("Matched column '{}' for {:?}", column.name, needles);
                Some(column.name.as_str())
            }
            None => None,
        }
    }

    /// [`Frame::find_column`] that logs a warning naming the default that will
    /// be applied when nothing matches.
    pub fn find_column_or_warn(&self, needles: &[&str], fallback: &str) -> Option<String> {
        let found = self.find_column(needles).map(str::to_string);
        if found.is_none() {
            warn!("No column matching {needles:?}; {fallback}");
        }
        found
    }

    pub fn value(&self, column: &str, row: usize) -> Option<&Value> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Display strings for one row, nulls rendered empty.
    pub fn row_strings(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.get(row).map(Value::as_display).unwrap_or_default())
            .collect()
    }

    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        (0..self.height).map(|row| self.row_strings(row))
    }

    /// Gathers the given rows, in the given order, into a new frame.
    pub fn take_rows(&self, indices: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                Column::new(
                    column.name.clone(),
                    indices
                        .iter()
                        .map(|&row| column.values.get(row).cloned().flatten())
                        .collect(),
                )
            })
            .collect();
        Self {
            columns,
            height: indices.len(),
        }
    }

    /// Keeps the first row seen for each distinct non-null `key`.
    pub fn distinct_by(&self, key: &str) -> Self {
        let Some(column) = self.column(key) else {
            return self.clone();
        };
        let mut seen = HashSet::new();
        let keep = column
            .values
            .iter()
            .enumerate()
            .filter_map(|(row, cell)| {
                let value = cell.as_ref()?;
                seen.insert(value.as_display()).then_some(row)
            })
            .collect::<Vec<_>>();
        self.take_rows(&keep)
    }

    /// Projects the named columns; names that do not exist are skipped.
    pub fn select(&self, names: &[&str]) -> Self {
        let columns = names
            .iter()
            .filter_map(|name| self.column(name).cloned())
            .collect::<Vec<_>>();
        let height = if columns.is_empty() { 0 } else { self.height };
        Self { columns, height }
    }

    /// Left join on a shared key column.
    ///
    /// Left row order is preserved; each left row appears once per matching
    /// right row, or once with nulls when nothing matches. Keys compare by
    /// display string and null keys never match. Non-key names present on
    /// both sides are suffixed `_x` (left) and `_y` (right).
    pub fn left_join(&self, right: &Frame, key: &str) -> Result<Self> {
        let left_key = self
            .column(key)
            .ok_or_else(|| anyhow!("Left side of join has no '{key}' column"))?;
        let right_key = right
            .column(key)
            .ok_or_else(|| anyhow!("Right side of join has no '{key}' column"))?;

        let mut lookup: HashMap<String, Vec<usize>> = HashMap::new();
        for (row, cell) in right_key.values.iter().enumerate() {
            if let Some(value) = cell {
                lookup.entry(value.as_display()).or_default().push(row);
            }
        }

        let mut left_rows = Vec::with_capacity(self.height);
        let mut right_rows: Vec<Option<usize>> = Vec::with_capacity(self.height);
        let mut matched = 0usize;
        for (row, cell) in left_key.values.iter().enumerate() {
            let bucket = cell
                .as_ref()
                .and_then(|value| lookup.get(&value.as_display()));
            match bucket {
                Some(bucket) => {
                    matched += 1;
                    for &right_row in bucket {
                        left_rows.push(row);
                        right_rows.push(Some(right_row));
                    }
                }
                None => {
                    left_rows.push(row);
                    right_rows.push(None);
                }
            }
        }

        let overlapping: HashSet<&str> = right
            .names()
            .filter(|name| *name != key && self.has_column(name))
            .collect();

        let mut columns = Vec::with_capacity(self.width() + right.width());
        for column in &self.columns {
            let name = if overlapping.contains(column.name.as_str()) {
                format!("{}_x", column.name)
            } else {
                column.name.clone()
            };
            let values = left_rows
                .iter()
                .map(|&row| column.values[row].clone())
                .collect();
            columns.push(Column::new(name, values));
        }
        for column in right.columns.iter().filter(|c| c.name != key) {
            let name = if overlapping.contains(column.name.as_str()) {
                format!("{}_y", column.name)
            } else {
                column.name.clone()
            };
            let values = right_rows
                .iter()
                .map(|row| row.and_then(|row| column.values[row].clone()))
                .collect();
            columns.push(Column::new(name, values));
        }

        debug!(
            "Left join on '{key}': {} of {} left row(s) matched, {} output row(s)",
            matched,
            self.height,
            left_rows.len()
        );
        Self::from_columns(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| Value::from(*v)))
            .collect()
    }

    #[test]
    fn from_records_infers_types_per_column() {
        let frame = Frame::from_records(
            vec!["id".into(), "city".into(), "km".into()],
            vec![
                vec!["1".into(), "Pune".into(), "12.5".into()],
                vec!["2".into(), "".into(), "7".into()],
            ],
        )
        .unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.value("id", 0), Some(&Value::Integer(1)));
        assert_eq!(frame.value("city", 1), None);
        assert_eq!(frame.value("km", 1), Some(&Value::Float(7.0)));
    }

    #[test]
    fn set_column_rejects_wrong_length() {
        let mut frame = Frame::from_columns(vec![Column::new("a", strings(&["x", "y"]))]).unwrap();
        assert!(frame.set_column("b", strings(&["only"])).is_err());
        frame.set_column("a", strings(&["p", "q"])).unwrap();
        assert_eq!(frame.value("a", 1), Some(&Value::from("q")));
        assert_eq!(frame.width(), 1);
    }

    #[test]
    fn find_column_is_first_match_in_column_order() {
        let frame = Frame::from_columns(vec![
            Column::new("route_distance_km", strings(&["1"])),
            Column::new("Traffic_Delay", strings(&["1"])),
            Column::new("delay_minutes", strings(&["1"])),
        ])
        .unwrap();
        assert_eq!(frame.find_column(&["traffic", "delay"]), Some("Traffic_Delay"));
        assert_eq!(frame.find_column(&["DISTANCE"]), Some("route_distance_km"));
        assert_eq!(frame.find_column(&["origin"]), None);
    }

    #[test]
    fn left_join_keeps_unmatched_and_suffixes_overlaps() {
        let left = Frame::from_columns(vec![
            Column::new("order_id", strings(&["1", "2", "3"])),
            Column::new("cost", strings(&["a", "b", "c"])),
        ])
        .unwrap();
        let right = Frame::from_columns(vec![
            Column::new("order_id", vec![Some(Value::Integer(3)), Some(Value::Integer(1))]),
            Column::new("cost", strings(&["C", "A"])),
            Column::new("rating", strings(&["5", "4"])),
        ])
        .unwrap();

        let joined = left.left_join(&right, "order_id").unwrap();
        assert_eq!(
            joined.headers(),
            vec!["order_id", "cost_x", "cost_y", "rating"]
        );
        assert_eq!(joined.height(), 3);
        assert_eq!(joined.value("cost_y", 0), Some(&Value::from("A")));
        assert_eq!(joined.value("rating", 1), None);
        assert_eq!(joined.value("rating", 2), Some(&Value::from("5")));
    }

    #[test]
    fn left_join_fans_out_duplicate_right_keys() {
        let left = Frame::from_columns(vec![Column::new("k", strings(&["a", "b"]))]).unwrap();
        let right = Frame::from_columns(vec![
            Column::new("k", strings(&["a", "a"])),
            Column::new("v", strings(&["1", "2"])),
        ])
        .unwrap();
        let joined = left.left_join(&right, "k").unwrap();
        assert_eq!(joined.height(), 3);
        assert_eq!(
            joined.records().collect::<Vec<_>>(),
            vec![vec!["a", "1"], vec!["a", "2"], vec!["b", ""]]
        );
    }

    #[test]
    fn distinct_by_keeps_first_occurrence() {
        let frame = Frame::from_columns(vec![
            Column::new("t", strings(&["VAN", "TRUCK", "VAN", ""])),
            Column::new("co2", strings(&["1", "2", "3", "4"])),
        ])
        .unwrap();
        let distinct = frame.distinct_by("t");
        assert_eq!(distinct.height(), 2);
        assert_eq!(distinct.value("co2", 0), Some(&Value::from("1")));
    }
}

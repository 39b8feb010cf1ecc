//! A minimal time-indexed numeric table.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use crate::config::TimeRange;
use crate::errors::MarketflowError;

/// A table of `f64` columns over a shared timestamp index.
///
/// Missing cells are NaN. Column order is preserved; every column has
/// exactly as many values as the index has timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    index: Vec<DateTime<Utc>>,
    columns: IndexMap<String, Vec<f64>>,
}

impl Frame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frame from an index and named columns.
    ///
    /// Every column must have the same length as the index.
    pub fn from_columns(
        index: Vec<DateTime<Utc>>,
        columns: IndexMap<String, Vec<f64>>,
    ) -> Result<Self, MarketflowError> {
        for (name, values) in &columns {
            if values.len() != index.len() {
                return Err(MarketflowError::Data(format!(
                    "column '{name}' has {} values but the index has {} timestamps",
                    values.len(),
                    index.len()
                )));
            }
        }
        Ok(Self { index, columns })
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    /// Returns true if the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The timestamp index.
    #[must_use]
    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// The column names, in declared order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// The values of one column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Adds or replaces a column.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), MarketflowError> {
        if values.len() != self.index.len() {
            return Err(MarketflowError::Data(format!(
                "column length {} does not match index length {}",
                values.len(),
                self.index.len()
            )));
        }
        self.columns.insert(name.into(), values);
        Ok(())
    }

    /// Drops the named columns; unknown names are ignored.
    pub fn drop_columns(&mut self, names: &[String]) {
        for name in names {
            self.columns.shift_remove(name);
        }
    }

    /// Rewrites every column name through the given function.
    pub fn rename_columns(&mut self, rename: impl Fn(&str) -> String) {
        let renamed: IndexMap<String, Vec<f64>> = self
            .columns
            .drain(..)
            .map(|(name, values)| (rename(&name), values))
            .collect();
        self.columns = renamed;
    }

    /// Returns a copy of every column name prefixed with `{prefix}_`.
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Self {
        let mut renamed = self.clone();
        renamed.rename_columns(|name| format!("{prefix}_{name}"));
        renamed
    }

    /// The first timestamp, if any.
    #[must_use]
    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.index.first().copied()
    }

    /// The last timestamp, if any.
    #[must_use]
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.index.last().copied()
    }

    /// Returns true if the index is strictly increasing.
    #[must_use]
    pub fn is_monotonic_increasing(&self) -> bool {
        self.index.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// Returns true if the index spans the whole time range.
    #[must_use]
    pub fn covers(&self, range: &TimeRange) -> bool {
        match (self.first_time(), self.last_time()) {
            (Some(first), Some(last)) => first <= range.begin_time && last >= range.end_time,
            _ => false,
        }
    }

    /// The rows whose timestamp lies inside the closed range.
    #[must_use]
    pub fn select_range(&self, range: &TimeRange) -> Self {
        let keep: Vec<usize> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, ts)| **ts >= range.begin_time && **ts <= range.end_time)
            .map(|(position, _)| position)
            .collect();
        self.take_rows(&keep)
    }

    /// Removes every row containing at least one NaN cell.
    pub fn drop_incomplete_rows(&mut self) {
        let keep: Vec<usize> = (0..self.index.len())
            .filter(|row| {
                self.columns
                    .values()
                    .all(|values| !values[*row].is_nan())
            })
            .collect();
        *self = self.take_rows(&keep);
    }

    /// Replaces each NaN cell with the nearest finite value above it in the
    /// same column. Leading NaN cells are left as they are.
    pub fn forward_fill(&mut self) {
        for values in self.columns.values_mut() {
            let mut last_seen = f64::NAN;
            for value in values.iter_mut() {
                if value.is_nan() {
                    *value = last_seen;
                } else {
                    last_seen = *value;
                }
            }
        }
    }

    /// Inner-joins two frames on their timestamp indexes.
    ///
    /// The result keeps only timestamps present in both frames and carries
    /// the columns of both; a column name present on both sides is an error.
    pub fn inner_join(&self, other: &Self) -> Result<Self, MarketflowError> {
        for name in other.column_names() {
            if self.columns.contains_key(name) {
                return Err(MarketflowError::Data(format!(
                    "join would duplicate column '{name}'"
                )));
            }
        }

        let other_rows: HashMap<DateTime<Utc>, usize> = other
            .index
            .iter()
            .enumerate()
            .map(|(position, ts)| (*ts, position))
            .collect();

        let mut pairs: Vec<(usize, usize)> = Vec::new();
        let mut index = Vec::new();
        for (position, ts) in self.index.iter().enumerate() {
            if let Some(other_position) = other_rows.get(ts) {
                pairs.push((position, *other_position));
                index.push(*ts);
            }
        }

        let mut columns: IndexMap<String, Vec<f64>> = IndexMap::new();
        for (name, values) in &self.columns {
            columns.insert(
                name.clone(),
                pairs.iter().map(|(mine, _)| values[*mine]).collect(),
            );
        }
        for (name, values) in &other.columns {
            columns.insert(
                name.clone(),
                pairs.iter().map(|(_, theirs)| values[*theirs]).collect(),
            );
        }

        Ok(Self { index, columns })
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        let index = rows.iter().map(|row| self.index[*row]).collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                (
                    name.clone(),
                    rows.iter().map(|row| values[*row]).collect::<Vec<f64>>(),
                )
            })
            .collect();
        Self { index, columns }
    }

    /// Parses a frame from CSV text with the given timestamp column.
    ///
    /// Timestamps parse as RFC 3339 or as plain `YYYY-MM-DD` dates (taken
    /// as midnight UTC). Empty, `null`, and `NaN` cells become NaN.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        date_column: &str,
    ) -> Result<Self, MarketflowError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let date_position = headers
            .iter()
            .position(|header| header == date_column)
            .ok_or_else(|| {
                MarketflowError::Data(format!("timestamp column '{date_column}' not found"))
            })?;

        let value_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != date_position)
            .map(|(position, header)| (position, header.to_string()))
            .collect();

        let mut index = Vec::new();
        let mut columns: IndexMap<String, Vec<f64>> = value_columns
            .iter()
            .map(|(_, name)| (name.clone(), Vec::new()))
            .collect();

        for record in csv_reader.records() {
            let record = record?;
            let raw_ts = record.get(date_position).unwrap_or_default();
            index.push(parse_timestamp(raw_ts)?);
            for (position, name) in &value_columns {
                let cell = record.get(*position).unwrap_or_default();
                if let Some(values) = columns.get_mut(name) {
                    values.push(parse_cell(cell));
                }
            }
        }

        Ok(Self { index, columns })
    }

    /// Reads a frame from a CSV file.
    pub fn read_csv(path: impl AsRef<Path>, date_column: &str) -> Result<Self, MarketflowError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file, date_column)
    }

    /// Writes the frame as CSV with the given timestamp column name.
    ///
    /// Timestamps render as RFC 3339; NaN cells render empty.
    pub fn write_csv(
        &self,
        path: impl AsRef<Path>,
        date_column: &str,
    ) -> Result<(), MarketflowError> {
        let file = std::fs::File::create(path)?;
        self.to_csv_writer(file, date_column)
    }

    /// Writes the frame as CSV to any writer.
    pub fn to_csv_writer<W: Write>(
        &self,
        writer: W,
        date_column: &str,
    ) -> Result<(), MarketflowError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec![date_column.to_string()];
        header.extend(self.column_names().map(ToString::to_string));
        csv_writer.write_record(&header)?;

        for (row, ts) in self.index.iter().enumerate() {
            let mut record = vec![ts.to_rfc3339()];
            for values in self.columns.values() {
                let value = values[row];
                record.push(if value.is_nan() {
                    String::new()
                } else {
                    value.to_string()
                });
            }
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, MarketflowError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| MarketflowError::Data(format!("invalid timestamp '{raw}'")))?;
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

fn parse_cell(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{day, sample_frame};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_columns_rejects_ragged_input() {
        let mut columns = IndexMap::new();
        columns.insert("open".to_string(), vec![1.0]);
        let error = Frame::from_columns(vec![day(1), day(2)], columns).unwrap_err();
        assert!(matches!(error, MarketflowError::Data(_)));
    }

    #[test]
    fn test_shape_and_access() {
        let frame = sample_frame();
        assert_eq!(frame.shape(), (5, 2));
        assert_eq!(frame.column("close").map(<[f64]>::len), Some(5));
        assert!(frame.column("volume").is_none());
    }

    #[test]
    fn test_select_range_is_inclusive() {
        let frame = sample_frame();
        let range = TimeRange {
            begin_time: day(2),
            end_time: day(4),
        };
        let selected = frame.select_range(&range);
        assert_eq!(selected.shape().0, 3);
        assert_eq!(selected.first_time(), Some(day(2)));
        assert_eq!(selected.last_time(), Some(day(4)));
    }

    #[test]
    fn test_monotonic_and_covers() {
        let frame = sample_frame();
        assert!(frame.is_monotonic_increasing());
        assert!(frame.covers(&TimeRange {
            begin_time: day(1),
            end_time: day(5),
        }));
        assert!(!frame.covers(&TimeRange {
            begin_time: day(1),
            end_time: day(9),
        }));
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let mut columns = IndexMap::new();
        columns.insert("a".to_string(), vec![1.0, f64::NAN, 3.0]);
        columns.insert("b".to_string(), vec![1.0, 2.0, 3.0]);
        let mut frame = Frame::from_columns(vec![day(1), day(2), day(3)], columns).unwrap();

        frame.drop_incomplete_rows();
        assert_eq!(frame.shape().0, 2);
        assert_eq!(frame.index(), &[day(1), day(3)]);
    }

    #[test]
    fn test_forward_fill() {
        let mut columns = IndexMap::new();
        columns.insert("a".to_string(), vec![f64::NAN, 2.0, f64::NAN, f64::NAN]);
        let mut frame =
            Frame::from_columns(vec![day(1), day(2), day(3), day(4)], columns).unwrap();

        frame.forward_fill();
        let values = frame.column("a").unwrap();
        assert!(values[0].is_nan());
        assert_eq!(&values[1..], &[2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_rename_and_prefix() {
        let mut frame = sample_frame();
        frame.rename_columns(str::to_uppercase);
        let names: Vec<&str> = frame.column_names().collect();
        assert_eq!(names, vec!["OPEN", "CLOSE"]);

        let prefixed = frame.prefixed("NVDA");
        let names: Vec<&str> = prefixed.column_names().collect();
        assert_eq!(names, vec!["NVDA_OPEN", "NVDA_CLOSE"]);
    }

    #[test]
    fn test_inner_join() {
        let mut left_columns = IndexMap::new();
        left_columns.insert("a".to_string(), vec![1.0, 2.0, 3.0]);
        let left = Frame::from_columns(vec![day(1), day(2), day(3)], left_columns).unwrap();

        let mut right_columns = IndexMap::new();
        right_columns.insert("b".to_string(), vec![20.0, 30.0, 40.0]);
        let right = Frame::from_columns(vec![day(2), day(3), day(4)], right_columns).unwrap();

        let joined = left.inner_join(&right).unwrap();
        assert_eq!(joined.index(), &[day(2), day(3)]);
        assert_eq!(joined.column("a"), Some(&[2.0, 3.0][..]));
        assert_eq!(joined.column("b"), Some(&[20.0, 30.0][..]));
    }

    #[test]
    fn test_inner_join_rejects_duplicate_columns() {
        let frame = sample_frame();
        let error = frame.inner_join(&sample_frame()).unwrap_err();
        assert!(matches!(error, MarketflowError::Data(_)));
    }

    #[test]
    fn test_csv_round_trip() {
        let frame = sample_frame();
        let mut buffer = Vec::new();
        frame.to_csv_writer(&mut buffer, "Date").unwrap();

        let parsed = Frame::from_csv_reader(buffer.as_slice(), "Date").unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_csv_parses_date_only_and_null_cells() {
        let text = "Date,Close\n2024-01-02,101.5\n2024-01-03,null\n";
        let frame = Frame::from_csv_reader(text.as_bytes(), "Date").unwrap();

        assert_eq!(frame.shape(), (2, 1));
        assert_eq!(frame.first_time(), Some(day(2)));
        let close = frame.column("Close").unwrap();
        assert_eq!(close[0], 101.5);
        assert!(close[1].is_nan());
    }

    #[test]
    fn test_csv_missing_date_column() {
        let text = "When,Close\n2024-01-02,1.0\n";
        let error = Frame::from_csv_reader(text.as_bytes(), "Date").unwrap_err();
        assert!(matches!(error, MarketflowError::Data(_)));
    }
}

//! Table Module
//! Thin wrapper over a Polars DataFrame with typed column access.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Row mask has {mask} entries but the table has {height} rows")]
    MaskLength { mask: usize, height: usize },
}

/// The loaded dataset. Column names are unique and trimmed.
#[derive(Debug, Clone, Default)]
pub struct Table {
    df: DataFrame,
}

impl Table {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        Ok(Self::new(DataFrame::new(columns)?))
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// `(name, dtype)` pairs in table order.
    pub fn schema(&self) -> Vec<(String, DataType)> {
        self.df
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.dtype().clone()))
            .collect()
    }

    fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.df
            .column(name)
            .map_err(|_| TableError::UnknownColumn(name.to_string()))
    }

    /// Values of a column cast to `f64`. Nulls and NaN come back as `None`.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        let as_f64 = self.column(name)?.cast(&DataType::Float64)?;
        let ca = as_f64.f64()?;
        Ok(ca
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Values of a column rendered as text. Nulls come back as `None`.
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>, TableError> {
        let as_text = self.column(name)?.cast(&DataType::String)?;
        let ca = as_text.as_materialized_series().str()?;
        Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
    }

    /// Keep the rows whose mask entry is `true`. Never mutates `self`.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Table, TableError> {
        if mask.len() != self.height() {
            return Err(TableError::MaskLength {
                mask: mask.len(),
                height: self.height(),
            });
        }
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        Ok(Self::new(self.df.filter(&mask)?))
    }

    /// Same columns, dtypes and values (nulls compare equal).
    pub fn same_content(&self, other: &Table) -> bool {
        self.df.equals_missing(&other.df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::new("A".into(), &["x", "y", "x"]),
            Column::new("V".into(), &[1i64, 2, 3]),
        ])
        .unwrap()
    }

    #[test]
    fn test_typed_access() {
        let table = sample();
        assert_eq!(table.column_names(), vec!["A", "V"]);
        assert_eq!(
            table.numeric_values("V").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
        assert_eq!(
            table.text_values("A").unwrap(),
            vec![Some("x".to_string()), Some("y".to_string()), Some("x".to_string())]
        );
    }

    #[test]
    fn test_unknown_column() {
        let err = sample().numeric_values("missing").unwrap_err();
        assert!(matches!(err, TableError::UnknownColumn(name) if name == "missing"));
    }

    #[test]
    fn test_filter_rows_leaves_source_untouched() {
        let table = sample();
        let filtered = table.filter_rows(&[true, false, true]).unwrap();
        assert_eq!(filtered.height(), 2);
        assert_eq!(table.height(), 3);
        assert_eq!(
            filtered.numeric_values("V").unwrap(),
            vec![Some(1.0), Some(3.0)]
        );
    }

    #[test]
    fn test_filter_rows_rejects_wrong_mask() {
        let err = sample().filter_rows(&[true]).unwrap_err();
        assert!(matches!(err, TableError::MaskLength { mask: 1, height: 3 }));
    }
}

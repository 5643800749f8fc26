//! Column Classifier Module
//! Splits column names into numerical, categorical and date-candidate sets by dtype.

use super::table::Table;
use polars::prelude::DataType;
use serde::Serialize;

/// Column name sets derived once per loaded Table.
///
/// `numerical` and `categorical` never overlap. Every non-numeric column
/// (text, boolean, date) is categorical and also a date candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnClassification {
    pub numerical: Vec<String>,
    pub categorical: Vec<String>,
    pub date_candidates: Vec<String>,
}

impl ColumnClassification {
    pub fn classify(table: &Table) -> Self {
        let mut classification = Self::default();

        for (name, dtype) in table.schema() {
            if is_numeric(&dtype) {
                classification.numerical.push(name);
                continue;
            }
            classification.categorical.push(name.clone());
            classification.date_candidates.push(name);
        }

        classification
    }

    pub fn is_numerical(&self, column: &str) -> bool {
        self.numerical.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

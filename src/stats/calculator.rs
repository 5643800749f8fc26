//! Statistics Calculator Module
//! Descriptive statistics per numerical column and the Pearson correlation matrix.

use crate::data::{Table, TableError};
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Descriptive statistics for a single numerical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn empty(column: &str) -> Self {
        Self {
            column: column.to_string(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Square matrix of pairwise correlations, rows and columns in `columns` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        Some(self.values[i][j])
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics over the present values of a column.
    pub fn compute_descriptive_stats(column: &str, values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary::empty(column);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let std = if n > 1 {
            values.iter().std_dev()
        } else {
            f64::NAN
        };

        ColumnSummary {
            column: column.to_string(),
            count: n,
            mean: values.iter().mean(),
            std,
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Summaries for every numerical column, computed in parallel, in input order.
    pub fn describe(table: &Table, numerical: &[String]) -> Result<Vec<ColumnSummary>, TableError> {
        let columns = numerical
            .iter()
            .map(|name| Ok((name.as_str(), table.numeric_values(name)?)))
            .collect::<Result<Vec<_>, TableError>>()?;

        Ok(columns
            .par_iter()
            .map(|(name, values)| {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                Self::compute_descriptive_stats(name, &present)
            })
            .collect())
    }

    /// Pearson correlation over rows where both values are present.
    pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
        let (a, b): (Vec<f64>, Vec<f64>) = xs
            .iter()
            .zip(ys.iter())
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .unzip();
        if a.len() < 2 {
            return f64::NAN;
        }

        let sa = a.iter().std_dev();
        let sb = b.iter().std_dev();
        if sa == 0.0 || sb == 0.0 {
            return f64::NAN;
        }
        let r = a.iter().covariance(b.iter()) / (sa * sb);
        r.clamp(-1.0, 1.0)
    }

    /// Pairwise correlation across all numerical columns.
    pub fn correlation_matrix(
        table: &Table,
        numerical: &[String],
    ) -> Result<CorrelationMatrix, TableError> {
        let columns = numerical
            .iter()
            .map(|name| table.numeric_values(name))
            .collect::<Result<Vec<_>, TableError>>()?;

        let values: Vec<Vec<f64>> = columns
            .par_iter()
            .map(|xs| columns.iter().map(|ys| Self::pearson(xs, ys)).collect())
            .collect();

        Ok(CorrelationMatrix {
            columns: numerical.to_vec(),
            values,
        })
    }
}

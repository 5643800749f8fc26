//! Chart Data Module
//! Pure aggregates behind each chart panel, independent of any drawing backend.

use super::labels::format_bar_label;
use crate::config::BarLabelFormat;
use crate::data::dates::YearMonth;
use crate::data::{Table, TableError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub size: Option<f64>,
}

/// Point cloud of two numerical columns, optionally sized by a third.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub x_column: String,
    pub y_column: String,
    pub size_column: Option<String>,
    pub points: Vec<ScatterPoint>,
}

impl ScatterData {
    /// Rows missing any of the plotted values are left out.
    pub fn build(
        table: &Table,
        x_column: &str,
        y_column: &str,
        size_column: Option<&str>,
    ) -> Result<Self, TableError> {
        let xs = table.numeric_values(x_column)?;
        let ys = table.numeric_values(y_column)?;
        let sizes = match size_column {
            Some(column) => Some(table.numeric_values(column)?),
            None => None,
        };

        let points = xs
            .iter()
            .zip(ys.iter())
            .enumerate()
            .filter_map(|(i, (x, y))| {
                let size = match &sizes {
                    Some(sizes) => Some(sizes[i]?),
                    None => None,
                };
                Some(ScatterPoint {
                    x: (*x)?,
                    y: (*y)?,
                    size,
                })
            })
            .collect();

        Ok(Self {
            x_column: x_column.to_string(),
            y_column: y_column.to_string(),
            size_column: size_column.map(str::to_string),
            points,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroup {
    pub category: String,
    pub mean: f64,
    pub label: String,
}

/// Mean of a numerical column per category, one bar per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarData {
    pub category_column: String,
    pub value_column: String,
    pub groups: Vec<BarGroup>,
}

impl BarData {
    /// Groups come out sorted by category. A category whose values are all
    /// missing keeps its bar with a NaN mean.
    pub fn build(
        table: &Table,
        category_column: &str,
        value_column: &str,
        label_format: &BarLabelFormat,
    ) -> Result<Self, TableError> {
        let categories = table.text_values(category_column)?;
        let values = table.numeric_values(value_column)?;

        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for (category, value) in categories.iter().zip(values.iter()) {
            let Some(category) = category else {
                continue;
            };
            let entry = sums.entry(category.as_str()).or_insert((0.0, 0));
            if let Some(v) = value {
                entry.0 += v;
                entry.1 += 1;
            }
        }

        let groups = sums
            .into_iter()
            .map(|(category, (sum, count))| {
                let mean = mean_of(sum, count);
                BarGroup {
                    category: category.to_string(),
                    mean,
                    label: format_bar_label(mean, label_format),
                }
            })
            .collect();

        Ok(Self {
            category_column: category_column.to_string(),
            value_column: value_column.to_string(),
            groups,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
}

/// Row count per distinct value of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieData {
    pub column: String,
    pub slices: Vec<PieSlice>,
}

impl PieData {
    /// Largest slice first; equal counts keep first-appearance order.
    pub fn build(table: &Table, column: &str) -> Result<Self, TableError> {
        let values = table.text_values(column)?;

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut slices: Vec<PieSlice> = Vec::new();
        for value in values.iter().flatten() {
            match index.get(value.as_str()) {
                Some(&i) => slices[i].count += 1,
                None => {
                    index.insert(value.as_str(), slices.len());
                    slices.push(PieSlice {
                        label: value.clone(),
                        count: 1,
                    });
                }
            }
        }
        slices.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(Self {
            column: column.to_string(),
            slices,
        })
    }

    pub fn total(&self) -> usize {
        self.slices.iter().map(|s| s.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub month: YearMonth,
    pub mean: f64,
}

/// Monthly mean of a numerical column along a coerced date column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesData {
    pub date_column: String,
    pub value_column: String,
    pub points: Vec<TimeSeriesPoint>,
}

impl TimeSeriesData {
    /// `dates` and `values` are row-aligned. Rows without a date are dropped;
    /// a month with no values gets a NaN mean.
    pub fn build(
        date_column: &str,
        value_column: &str,
        dates: &[Option<NaiveDate>],
        values: &[Option<f64>],
    ) -> Self {
        let mut buckets: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
        for (date, value) in dates.iter().zip(values.iter()) {
            let Some(date) = date else {
                continue;
            };
            let entry = buckets.entry(YearMonth::of(*date)).or_insert((0.0, 0));
            if let Some(v) = value {
                entry.0 += v;
                entry.1 += 1;
            }
        }

        Self {
            date_column: date_column.to_string(),
            value_column: value_column.to_string(),
            points: buckets
                .into_iter()
                .map(|(month, (sum, count))| TimeSeriesPoint {
                    month,
                    mean: mean_of(sum, count),
                })
                .collect(),
        }
    }
}

fn mean_of(sum: f64, count: usize) -> f64 {
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::new("A".into(), &["x", "y", "x"]),
            Column::new("V".into(), &[1i64, 2, 3]),
        ])
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_bar_means_per_category() {
        let bar = BarData::build(&sample(), "A", "V", &BarLabelFormat::default()).unwrap();
        let pairs: Vec<(&str, f64)> = bar
            .groups
            .iter()
            .map(|g| (g.category.as_str(), g.mean))
            .collect();
        assert_eq!(pairs, vec![("x", 2.0), ("y", 2.0)]);
        assert_eq!(bar.groups[0].label, "$2.00");
    }

    #[test]
    fn test_bar_keeps_category_without_values() {
        let table = Table::from_columns(vec![
            Column::new("A".into(), &[Some("b"), Some("a"), None]),
            Column::new("V".into(), &[None, Some(4.0f64), Some(9.0)]),
        ])
        .unwrap();
        let bar = BarData::build(&table, "A", "V", &BarLabelFormat::Plain).unwrap();
        assert_eq!(bar.groups.len(), 2);
        assert_eq!(bar.groups[0].category, "a");
        assert!(bar.groups[1].mean.is_nan());
    }

    #[test]
    fn test_pie_counts() {
        let pie = PieData::build(&sample(), "A").unwrap();
        assert_eq!(
            pie.slices,
            vec![
                PieSlice {
                    label: "x".to_string(),
                    count: 2
                },
                PieSlice {
                    label: "y".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(pie.total(), 3);
    }

    #[test]
    fn test_pie_ties_keep_appearance_order() {
        let table = Table::from_columns(vec![Column::new("A".into(), &["q", "p", "p", "q"])])
            .unwrap();
        let pie = PieData::build(&table, "A").unwrap();
        assert_eq!(pie.slices[0].label, "q");
    }

    #[test]
    fn test_scatter_drops_incomplete_rows() {
        let table = Table::from_columns(vec![
            Column::new("x".into(), &[Some(1.0f64), Some(2.0), None]),
            Column::new("y".into(), &[Some(3.0f64), Some(4.0), Some(5.0)]),
            Column::new("s".into(), &[None, Some(1.0f64), Some(2.0)]),
        ])
        .unwrap();

        let plain = ScatterData::build(&table, "x", "y", None).unwrap();
        assert_eq!(plain.points.len(), 2);

        let sized = ScatterData::build(&table, "x", "y", Some("s")).unwrap();
        assert_eq!(
            sized.points,
            vec![ScatterPoint {
                x: 2.0,
                y: 4.0,
                size: Some(1.0)
            }]
        );
    }

    #[test]
    fn test_time_series_monthly_mean() {
        let dates = [date(2023, 1, 5), date(2023, 1, 20)];
        let values = [Some(10.0), Some(20.0)];
        let ts = TimeSeriesData::build("d", "V", &dates, &values);
        assert_eq!(ts.points.len(), 1);
        assert_eq!(ts.points[0].month.to_string(), "2023-01");
        assert_eq!(ts.points[0].mean, 15.0);
    }

    #[test]
    fn test_time_series_is_ascending_and_skips_missing_dates() {
        let dates = [date(2023, 3, 1), None, date(2022, 12, 31), date(2023, 3, 9)];
        let values = [Some(1.0), Some(100.0), Some(2.0), None];
        let ts = TimeSeriesData::build("d", "V", &dates, &values);
        let months: Vec<String> = ts.points.iter().map(|p| p.month.to_string()).collect();
        assert_eq!(months, vec!["2022-12", "2023-03"]);
        assert_eq!(ts.points[1].mean, 1.0);
    }
}

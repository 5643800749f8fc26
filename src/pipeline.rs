//! Analysis Pipeline
//! One full pass per interaction: filter the table, then derive statistics,
//! chart data and the export artifact from the filtered view.

use crate::charts::{BarData, PieData, ScatterData, TimeSeriesData};
use crate::config::DashboardConfig;
use crate::data::dates::{coerce_candidates, DateCoercion};
use crate::data::{
    apply_filters, load_upload, ColumnClassification, FilterOptions, FilterSelection,
    LoaderError, Table, TableError, Upload,
};
use crate::export::{ExportArtifact, ExportError};
use crate::stats::{ColumnSummary, CorrelationMatrix, StatsCalculator};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Everything derived once per upload.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source_name: String,
    pub table: Table,
    pub classification: ColumnClassification,
    /// Filter choices, taken from the unfiltered table.
    pub filter_options: Vec<FilterOptions>,
}

impl Dataset {
    pub fn new(source_name: impl Into<String>, table: Table) -> Result<Self, TableError> {
        let classification = ColumnClassification::classify(&table);
        let filter_options = FilterOptions::build(&table, &classification.categorical)?;
        Ok(Self {
            source_name: source_name.into(),
            table,
            classification,
            filter_options,
        })
    }

    pub fn from_upload(upload: &Upload, config: &DashboardConfig) -> Result<Self, PipelineError> {
        let table = load_upload(upload, config)?;
        Ok(Self::new(upload.file_name.clone(), table)?)
    }
}

/// Column picks from the chart selectors. `None` means "use the default".
/// After a pass, `RenderModel::choices` holds what was actually used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChoices {
    pub scatter_x: Option<String>,
    pub scatter_y: Option<String>,
    /// Sizing is off unless a numerical column is picked.
    pub scatter_size: Option<String>,
    pub bar_category: Option<String>,
    pub bar_value: Option<String>,
    pub pie_column: Option<String>,
    pub series_date: Option<String>,
    pub series_value: Option<String>,
}

/// Result of trying a date-candidate column for the time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionReport {
    pub column: String,
    pub coerced: bool,
    /// Non-empty cells that were not dates.
    pub unparsed: usize,
    pub reason: Option<String>,
}

impl From<&DateCoercion> for CoercionReport {
    fn from(coercion: &DateCoercion) -> Self {
        Self {
            column: coercion.column.clone(),
            coerced: coercion.is_coerced(),
            unparsed: coercion.unparsed,
            reason: coercion.outcome.as_ref().err().map(|e| e.to_string()),
        }
    }
}

/// Everything a UI needs to draw one pass. Absent panels are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub title: String,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub classification: ColumnClassification,
    pub statistics: Option<Vec<ColumnSummary>>,
    pub correlation: Option<CorrelationMatrix>,
    pub scatter: Option<ScatterData>,
    pub bar: Option<BarData>,
    pub pie: Option<PieData>,
    pub date_report: Vec<CoercionReport>,
    /// Date candidates that coerced successfully, offered for the time series.
    pub date_columns: Vec<String>,
    pub time_series: Option<TimeSeriesData>,
    pub choices: UserChoices,
    pub export: ExportArtifact,
}

/// Full pass from an optional upload. No upload is the empty state.
pub fn run(
    upload: Option<&Upload>,
    selection: &FilterSelection,
    choices: &UserChoices,
    config: &DashboardConfig,
) -> Result<Option<RenderModel>, PipelineError> {
    let Some(upload) = upload else {
        debug!("No upload yet, nothing to render");
        return Ok(None);
    };
    let dataset = Dataset::from_upload(upload, config)?;
    compute(&dataset, selection, choices, config).map(Some)
}

/// Recompute every panel from scratch for the current selections.
pub fn compute(
    dataset: &Dataset,
    selection: &FilterSelection,
    choices: &UserChoices,
    config: &DashboardConfig,
) -> Result<RenderModel, PipelineError> {
    let classes = &dataset.classification;
    let numerical = &classes.numerical;
    let categorical = &classes.categorical;

    let filtered = apply_filters(&dataset.table, selection, categorical)?;
    let mut used = UserChoices::default();

    let (statistics, correlation, scatter) = if numerical.is_empty() {
        (None, None, None)
    } else {
        let statistics = StatsCalculator::describe(&filtered, numerical)?;
        let correlation = StatsCalculator::correlation_matrix(&filtered, numerical)?;

        used.scatter_x = pick(&choices.scatter_x, numerical, 0);
        used.scatter_y = pick(&choices.scatter_y, numerical, 1);
        used.scatter_size = choices
            .scatter_size
            .as_ref()
            .filter(|c| numerical.contains(c))
            .cloned();
        let scatter = match (&used.scatter_x, &used.scatter_y) {
            (Some(x), Some(y)) => Some(ScatterData::build(
                &filtered,
                x,
                y,
                used.scatter_size.as_deref(),
            )?),
            _ => None,
        };
        (Some(statistics), Some(correlation), scatter)
    };

    let bar = if categorical.is_empty() || numerical.is_empty() {
        None
    } else {
        used.bar_category = pick(&choices.bar_category, categorical, 0);
        used.bar_value = pick(&choices.bar_value, numerical, 0);
        match (&used.bar_category, &used.bar_value) {
            (Some(category), Some(value)) => Some(BarData::build(
                &filtered,
                category,
                value,
                &config.bar_label,
            )?),
            _ => None,
        }
    };

    let pie = match pick(&choices.pie_column, categorical, 0) {
        Some(column) => {
            let pie = PieData::build(&filtered, &column)?;
            used.pie_column = Some(column);
            Some(pie)
        }
        None => None,
    };

    let coercions = coerce_candidates(&filtered, &classes.date_candidates)?;
    let date_report: Vec<CoercionReport> = coercions.iter().map(CoercionReport::from).collect();
    let date_columns: Vec<String> = coercions
        .iter()
        .filter(|c| c.is_coerced())
        .map(|c| c.column.clone())
        .collect();

    used.series_date = pick(&choices.series_date, &date_columns, 0);
    used.series_value = pick(&choices.series_value, numerical, 0);
    let time_series = match (&used.series_date, &used.series_value) {
        (Some(date_column), Some(value_column)) => {
            let dates = coercions
                .iter()
                .find(|c| &c.column == date_column)
                .and_then(|c| c.outcome.as_ref().ok());
            match dates {
                Some(dates) => {
                    let values = filtered.numeric_values(value_column)?;
                    Some(TimeSeriesData::build(
                        date_column,
                        value_column,
                        dates,
                        &values,
                    ))
                }
                None => None,
            }
        }
        _ => None,
    };

    let export = ExportArtifact::from_table(&filtered, config)?;

    debug!(
        "Pass over '{}': {} of {} rows after {} filter(s)",
        dataset.source_name,
        filtered.height(),
        dataset.table.height(),
        selection.iter().count()
    );

    Ok(RenderModel {
        title: config.page_title.clone(),
        total_rows: dataset.table.height(),
        filtered_rows: filtered.height(),
        classification: classes.clone(),
        statistics,
        correlation,
        scatter,
        bar,
        pie,
        date_report,
        date_columns,
        time_series,
        choices: used,
        export,
    })
}

/// A valid user pick, else the option at `default_index` (clamped to the
/// last option), else nothing when there are no options.
fn pick(choice: &Option<String>, options: &[String], default_index: usize) -> Option<String> {
    match choice {
        Some(c) if options.contains(c) => Some(c.clone()),
        _ => options
            .get(default_index.min(options.len().saturating_sub(1)))
            .cloned(),
    }
}

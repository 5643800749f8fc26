//! Filter Module
//! Builds per-column option lists and applies categorical selections to a Table.

use super::table::{Table, TableError};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Distinct values offered for one categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub column: String,
    /// Non-null values in order of first appearance, no duplicates.
    pub values: Vec<String>,
}

impl FilterOptions {
    /// Option lists for every categorical column, taken from the unfiltered table.
    pub fn build(table: &Table, categorical: &[String]) -> Result<Vec<Self>, TableError> {
        categorical
            .iter()
            .map(|column| {
                Ok(Self {
                    column: column.clone(),
                    values: distinct_values(&table.text_values(column)?),
                })
            })
            .collect()
    }
}

fn distinct_values(values: &[Option<String>]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .flatten()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

/// Chosen values per categorical column.
///
/// A column without an entry imposes no constraint. An empty selection is
/// never stored, so "nothing picked" always means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    selected: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection for `column`; an empty set clears it.
    pub fn set<I, S>(&mut self, column: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.selected.remove(column);
        } else {
            self.selected.insert(column.to_string(), values);
        }
    }

    /// Toggle a single value on or off.
    pub fn toggle(&mut self, column: &str, value: &str, on: bool) {
        let mut values = self.selected.remove(column).unwrap_or_default();
        if on {
            values.insert(value.to_string());
        } else {
            values.remove(value);
        }
        self.set(column, values);
    }

    pub fn clear(&mut self, column: &str) {
        self.selected.remove(column);
    }

    pub fn is_selected(&self, column: &str, value: &str) -> bool {
        self.selected
            .get(column)
            .is_some_and(|values| values.contains(value))
    }

    pub fn get(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.selected.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.selected.iter()
    }
}

/// Rows of `table` whose value in every constrained column is one of the
/// selected values. Columns not listed in `categorical` are ignored.
pub fn apply_filters(
    table: &Table,
    selection: &FilterSelection,
    categorical: &[String],
) -> Result<Table, TableError> {
    if selection.is_empty() {
        return Ok(table.clone());
    }

    let mut keep = vec![true; table.height()];
    let mut active = 0;

    for (column, allowed) in selection.iter() {
        if !categorical.contains(column) {
            debug!("Ignoring filter on non-categorical column '{}'", column);
            continue;
        }
        active += 1;
        let values = table.text_values(column)?;
        for (flag, value) in keep.iter_mut().zip(values.iter()) {
            *flag &= value.as_ref().is_some_and(|v| allowed.contains(v));
        }
    }

    if active == 0 {
        return Ok(table.clone());
    }
    table.filter_rows(&keep)
}

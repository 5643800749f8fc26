//! Chart Viewer Widget
//! Central scrollable panel: statistics, the five chart panels with their
//! selectors, and the download button.

use crate::charts::ChartPlotter;
use crate::pipeline::{RenderModel, UserChoices};
use egui::{Color32, ComboBox, RichText, ScrollArea};

const LABEL_WIDTH: f32 = 190.0;
const COMBO_WIDTH: f32 = 200.0;

/// Actions triggered by the chart viewer
#[derive(Debug, Clone, PartialEq)]
pub enum ChartViewerAction {
    None,
    ChoicesChanged,
    Download,
}

#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the empty state shown before any upload.
    pub fn show_empty(&self, ui: &mut egui::Ui, title: &str) {
        ui.heading(format!("📊 {}", title));
        ui.centered_and_justified(|ui| {
            ui.label(
                RichText::new("Upload a dataset to begin")
                    .size(20.0)
                    .color(Color32::GRAY),
            );
        });
    }

    pub fn show(
        &self,
        ui: &mut egui::Ui,
        model: &RenderModel,
        choices: &mut UserChoices,
    ) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;
        let numerical = &model.classification.numerical;
        let categorical = &model.classification.categorical;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(format!("📊 {}", model.title));
                ui.label(
                    RichText::new(format!(
                        "Showing {} of {} rows",
                        model.filtered_rows, model.total_rows
                    ))
                    .color(Color32::GRAY),
                );
                ui.add_space(10.0);

                if let Some(summaries) = &model.statistics {
                    egui::CollapsingHeader::new("Numerical Column Statistics")
                        .default_open(false)
                        .show(ui, |ui| ChartPlotter::draw_stats_table(ui, summaries));
                    ui.add_space(10.0);
                }

                if let Some(matrix) = &model.correlation {
                    Self::section(ui, "Correlation Matrix");
                    ChartPlotter::draw_correlation_heatmap(ui, matrix);
                }

                if let Some(scatter) = &model.scatter {
                    Self::section(ui, "Scatter Plot between Two Numerical Variables");
                    let mut changed = false;
                    changed |= column_combo(
                        ui,
                        "scatter_x",
                        "Select X-axis",
                        &mut choices.scatter_x,
                        numerical,
                        false,
                    );
                    changed |= column_combo(
                        ui,
                        "scatter_y",
                        "Select Y-axis",
                        &mut choices.scatter_y,
                        numerical,
                        false,
                    );
                    changed |= column_combo(
                        ui,
                        "scatter_size",
                        "Select Size variable",
                        &mut choices.scatter_size,
                        numerical,
                        true,
                    );
                    if changed {
                        action = ChartViewerAction::ChoicesChanged;
                    }
                    let r = model
                        .correlation
                        .as_ref()
                        .and_then(|m| m.get(&scatter.x_column, &scatter.y_column));
                    if let Some(r) = r.filter(|r| !r.is_nan()) {
                        ui.label(
                            RichText::new(format!("Pearson r = {:.2}", r)).color(Color32::GRAY),
                        );
                    }
                    ChartPlotter::draw_scatter(ui, scatter);
                }

                if let Some(bar) = &model.bar {
                    Self::section(
                        ui,
                        "Bar Chart of Categorical Variables with a Numerical Value",
                    );
                    let mut changed = false;
                    changed |= column_combo(
                        ui,
                        "bar_category",
                        "Select Categorical Variable",
                        &mut choices.bar_category,
                        categorical,
                        false,
                    );
                    changed |= column_combo(
                        ui,
                        "bar_value",
                        "Select Numerical Variable",
                        &mut choices.bar_value,
                        numerical,
                        false,
                    );
                    if changed {
                        action = ChartViewerAction::ChoicesChanged;
                    }
                    ChartPlotter::draw_bar_chart(ui, bar);
                }

                if let Some(pie) = &model.pie {
                    Self::section(ui, "Pie Chart for Categorical Variables");
                    if column_combo(
                        ui,
                        "pie_column",
                        "Select a Categorical Variable for Pie Chart",
                        &mut choices.pie_column,
                        categorical,
                        false,
                    ) {
                        action = ChartViewerAction::ChoicesChanged;
                    }
                    ui.label(
                        RichText::new(format!("Distribution of {}", pie.column)).strong(),
                    );
                    ChartPlotter::draw_pie_chart(ui, pie);
                }

                if let Some(series) = &model.time_series {
                    Self::section(ui, "Time Series Analysis");
                    let mut changed = false;
                    changed |= column_combo(
                        ui,
                        "series_date",
                        "Select Date Column",
                        &mut choices.series_date,
                        &model.date_columns,
                        false,
                    );
                    changed |= column_combo(
                        ui,
                        "series_value",
                        "Select Numerical Column for Time Series",
                        &mut choices.series_value,
                        numerical,
                        false,
                    );
                    if changed {
                        action = ChartViewerAction::ChoicesChanged;
                    }
                    ui.label(
                        RichText::new(format!("{} Over Time", series.value_column)).strong(),
                    );
                    ChartPlotter::draw_time_series(ui, series);
                }

                ui.add_space(15.0);
                ui.separator();
                let button =
                    egui::Button::new(RichText::new("⬇ Download Filtered Data").size(14.0))
                        .min_size(egui::vec2(200.0, 30.0));
                if ui.add(button).clicked() {
                    action = ChartViewerAction::Download;
                }
                ui.add_space(20.0);
            });

        action
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.add_space(15.0);
        ui.label(RichText::new(title).size(18.0).strong());
        ui.add_space(5.0);
    }
}

/// Single-select over `options`, optionally with a leading "None" entry.
/// Returns true when the pick changed.
fn column_combo(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    current: &mut Option<String>,
    options: &[String],
    allow_none: bool,
) -> bool {
    let before = current.clone();
    ui.horizontal(|ui| {
        ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new(label));
        ComboBox::from_id_salt(id)
            .width(COMBO_WIDTH)
            .selected_text(current.as_deref().unwrap_or("None"))
            .show_ui(ui, |ui| {
                if allow_none {
                    ui.selectable_value(current, None, "None");
                }
                for option in options {
                    ui.selectable_value(current, Some(option.clone()), option);
                }
            });
    });
    *current != before
}

//! Control Panel Widget
//! Left side panel: upload, one multi-select per categorical column, display options.

use crate::config::{BarLabelFormat, DashboardConfig};
use crate::data::{FilterOptions, FilterSelection};
use egui::{Color32, RichText, ScrollArea};

/// Left side control panel with file selection and filter controls.
pub struct ControlPanel {
    pub file_name: Option<String>,
    pub selection: FilterSelection,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            file_name: None,
            selection: FilterSelection::new(),
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all filters (a new table was loaded).
    pub fn reset_filters(&mut self) {
        self.selection = FilterSelection::new();
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        filters: &[FilterOptions],
        config: &mut DashboardConfig,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.add_space(5.0);
        ui.label(RichText::new("📁 Upload a dataset").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .file_name
                        .clone()
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.file_name.is_some() {
                            ui.visuals().text_color()
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseFile;
                        }
                    });
                });
                ui.label(
                    RichText::new("csv, txt, xlsx, xls")
                        .size(10.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(5.0);
        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        ui.add_space(10.0);
        ui.separator();

        if !filters.is_empty() {
            ui.label(RichText::new("Choose your filters:").size(14.0).strong());
            ui.add_space(5.0);
            for options in filters {
                if self.show_filter(ui, options) {
                    action = ControlPanelAction::FiltersChanged;
                }
            }
            ui.add_space(10.0);
            ui.separator();
        }

        ui.label(RichText::new("⚙️ Display").size(14.0).strong());
        ui.add_space(5.0);
        let before = config.bar_label.clone();
        ui.horizontal(|ui| {
            ui.label("Bar labels:");
            let currency = BarLabelFormat::default();
            let is_currency = matches!(config.bar_label, BarLabelFormat::Currency { .. });
            if ui.radio(is_currency, "Currency").clicked() && !is_currency {
                config.bar_label = currency;
            }
            if ui.radio(!is_currency, "Plain").clicked() {
                config.bar_label = BarLabelFormat::Plain;
            }
        });
        if config.bar_label != before {
            action = ControlPanelAction::OptionsChanged;
        }

        action
    }

    /// One multi-select. Returns true when the selection changed.
    fn show_filter(&mut self, ui: &mut egui::Ui, options: &FilterOptions) -> bool {
        let column = options.column.as_str();
        let picked = self.selection.get(column).map(|s| s.len()).unwrap_or(0);
        let title = if picked == 0 {
            format!("Select values for {}", column)
        } else {
            format!("Select values for {} ({})", column, picked)
        };

        let mut changed = false;
        egui::CollapsingHeader::new(title)
            .id_salt(("filter", column))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui.small_button("Select All").clicked() {
                        self.selection.set(column, options.values.iter().cloned());
                        changed = true;
                    }
                    if ui.small_button("Clear All").clicked() {
                        self.selection.clear(column);
                        changed = true;
                    }
                });
                ScrollArea::vertical()
                    .id_salt(("filter_values", column))
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for value in &options.values {
                            let mut on = self.selection.is_selected(column, value);
                            if ui.checkbox(&mut on, value).changed() {
                                self.selection.toggle(column, value, on);
                                changed = true;
                            }
                        }
                    });
            });
        changed
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    FiltersChanged,
    OptionsChanged,
}

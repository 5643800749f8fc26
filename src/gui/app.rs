//! Dashboard Main Application
//! Main window with control panel and chart viewer. Every interaction marks
//! the view dirty and the next frame recomputes the whole render model.

use crate::config::DashboardConfig;
use crate::data::{FileKind, Upload};
use crate::gui::{ChartViewer, ChartViewerAction, ControlPanel, ControlPanelAction};
use crate::pipeline::{self, Dataset, RenderModel, UserChoices};
use anyhow::{Context, Result};
use egui::SidePanel;
use log::{error, info};
use std::path::Path;

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    dataset: Option<Dataset>,
    choices: UserChoices,
    model: Option<RenderModel>,
    dirty: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        Self {
            config,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            dataset: None,
            choices: UserChoices::default(),
            model: None,
            dirty: false,
        }
    }

    fn load_dataset(path: &Path, config: &DashboardConfig) -> Result<Dataset> {
        let upload = Upload::from_path(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let dataset = Dataset::from_upload(&upload, config)
            .with_context(|| format!("parsing {}", upload.file_name))?;
        Ok(dataset)
    }

    /// Handle file selection; a new upload replaces the table wholesale.
    fn handle_browse_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Datasets", &FileKind::EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        self.control_panel.file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        self.control_panel.reset_filters();
        self.choices = UserChoices::default();
        self.model = None;

        match Self::load_dataset(&path, &self.config) {
            Ok(dataset) => {
                self.control_panel.set_status(&format!(
                    "Loaded {} rows, {} columns",
                    dataset.table.height(),
                    dataset.table.width()
                ));
                self.dataset = Some(dataset);
                self.dirty = true;
            }
            Err(e) => {
                error!("{:#}", e);
                self.control_panel.set_status(&format!("Error: {:#}", e));
                self.dataset = None;
            }
        }
    }

    /// Re-run the pipeline for the current filters and selector picks.
    fn recompute(&mut self) {
        self.dirty = false;
        let Some(dataset) = &self.dataset else {
            self.model = None;
            return;
        };

        match pipeline::compute(
            dataset,
            &self.control_panel.selection,
            &self.choices,
            &self.config,
        ) {
            Ok(model) => {
                self.choices = model.choices.clone();
                self.model = Some(model);
            }
            Err(e) => {
                error!("{}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
                self.model = None;
            }
        }
    }

    fn handle_download(&mut self) {
        let Some(model) = &self.model else {
            return;
        };
        let export = &model.export;

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name(&export.file_name)
            .save_file()
        else {
            return;
        };

        match export.save(&path) {
            Ok(()) => {
                info!("Exported {} rows", model.filtered_rows);
                self.control_panel
                    .set_status(&format!("Saved {}", path.display()));
            }
            Err(e) => {
                error!("{}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.dirty {
            self.recompute();
        }

        // Left panel - upload and filters
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let filters = self
                        .dataset
                        .as_ref()
                        .map(|d| d.filter_options.as_slice())
                        .unwrap_or(&[]);
                    let action = self.control_panel.show(ui, filters, &mut self.config);

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::FiltersChanged | ControlPanelAction::OptionsChanged => {
                            self.dirty = true
                        }
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - analysis
        egui::CentralPanel::default().show(ctx, |ui| {
            let action = match &self.model {
                Some(model) => self.chart_viewer.show(ui, model, &mut self.choices),
                None => {
                    self.chart_viewer.show_empty(ui, &self.config.page_title);
                    ChartViewerAction::None
                }
            };

            match action {
                ChartViewerAction::ChoicesChanged => self.dirty = true,
                ChartViewerAction::Download => self.handle_download(),
                ChartViewerAction::None => {}
            }
        });

        if self.dirty {
            ctx.request_repaint();
        }
    }
}

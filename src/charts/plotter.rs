//! Chart Plotter Module
//! Draws every dashboard panel with egui_plot from precomputed chart data.

use super::data::{BarData, PieData, ScatterData, TimeSeriesData};
use crate::stats::{ColumnSummary, CorrelationMatrix};
use egui::{Align2, Color32, RichText, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};
use std::f64::consts::{FRAC_PI_2, TAU};

pub const PLOT_HEIGHT: f32 = 320.0;

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(99, 110, 250),  // Indigo
    Color32::from_rgb(239, 85, 59),   // Red
    Color32::from_rgb(0, 204, 150),   // Green
    Color32::from_rgb(171, 99, 250),  // Purple
    Color32::from_rgb(255, 161, 90),  // Orange
    Color32::from_rgb(25, 211, 243),  // Cyan
    Color32::from_rgb(255, 102, 146), // Pink
    Color32::from_rgb(182, 232, 128), // Lime
    Color32::from_rgb(255, 151, 255), // Magenta
    Color32::from_rgb(254, 203, 82),  // Yellow
];

const NEGATIVE: Color32 = Color32::from_rgb(33, 102, 172);
const NEUTRAL: Color32 = Color32::from_rgb(247, 247, 247);
const POSITIVE: Color32 = Color32::from_rgb(178, 24, 43);

/// Draws the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn palette_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Blue for -1, near-white for 0, red for +1. NaN is grey.
    pub fn correlation_color(r: f64) -> Color32 {
        if r.is_nan() {
            return Color32::GRAY;
        }
        let r = r.clamp(-1.0, 1.0);
        let (from, to, t) = if r < 0.0 {
            (NEUTRAL, NEGATIVE, -r)
        } else {
            (NEUTRAL, POSITIVE, r)
        };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color32::from_rgb(
            mix(from.r(), to.r()),
            mix(from.g(), to.g()),
            mix(from.b(), to.b()),
        )
    }

    fn index_label(labels: &[String], value: f64) -> String {
        let idx = value.round();
        if (value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    fn format_cell(v: f64) -> String {
        if v.is_nan() {
            "NaN".to_string()
        } else {
            format!("{:.4}", v)
        }
    }

    /// Describe-style table: one row per numerical column.
    pub fn draw_stats_table(ui: &mut egui::Ui, summaries: &[ColumnSummary]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("numerical_statistics")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
                        {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for s in summaries {
                            ui.label(RichText::new(&s.column).strong().size(11.0));
                            ui.label(RichText::new(s.count.to_string()).size(11.0));
                            for v in [s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max] {
                                ui.label(RichText::new(Self::format_cell(v)).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Annotated heatmap; row 0 at the top.
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let n = matrix.columns.len();
        let x_labels = matrix.columns.clone();
        let y_labels: Vec<String> = matrix.columns.iter().rev().cloned().collect();

        Plot::new("correlation_matrix")
            .height(PLOT_HEIGHT.max(40.0 * n as f32))
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .x_axis_formatter(move |mark, _range| Self::index_label(&x_labels, mark.value))
            .y_axis_formatter(move |mark, _range| Self::index_label(&y_labels, mark.value))
            .show(ui, |plot_ui| {
                for (i, row) in matrix.values.iter().enumerate() {
                    let y = (n - 1 - i) as f64;
                    for (j, &r) in row.iter().enumerate() {
                        let x = j as f64;
                        let cell = vec![
                            [x - 0.5, y - 0.5],
                            [x + 0.5, y - 0.5],
                            [x + 0.5, y + 0.5],
                            [x - 0.5, y + 0.5],
                        ];
                        let fill = Self::correlation_color(r);
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(cell))
                                .fill_color(fill)
                                .stroke(Stroke::new(1.0, Color32::WHITE)),
                        );

                        let text_color = if r.abs() > 0.6 {
                            Color32::WHITE
                        } else {
                            Color32::BLACK
                        };
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(x, y),
                                RichText::new(Self::format_cell(r)).size(12.0),
                            )
                            .color(text_color)
                            .anchor(Align2::CENTER_CENTER),
                        );
                    }
                }
            });
    }

    /// Scatter plot; with a size column, radius scales between 2 and 12 px.
    pub fn draw_scatter(ui: &mut egui::Ui, data: &ScatterData) {
        let (min_size, max_size) = data
            .points
            .iter()
            .filter_map(|p| p.size)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s), hi.max(s))
            });

        Plot::new("scatter_plot")
            .height(PLOT_HEIGHT)
            .x_axis_label(data.x_column.clone())
            .y_axis_label(data.y_column.clone())
            .show(ui, |plot_ui| {
                if data.size_column.is_none() {
                    let points: PlotPoints = data.points.iter().map(|p| [p.x, p.y]).collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(3.0)
                            .color(Self::palette_color(0)),
                    );
                    return;
                }

                // One Points item per integer radius keeps the item count small.
                let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); 11];
                for p in &data.points {
                    let Some(size) = p.size else { continue };
                    let t = if max_size > min_size {
                        (size - min_size) / (max_size - min_size)
                    } else {
                        0.5
                    };
                    let bucket = (t * 10.0).round().clamp(0.0, 10.0) as usize;
                    buckets[bucket].push([p.x, p.y]);
                }
                for (bucket, points) in buckets.into_iter().enumerate() {
                    if points.is_empty() {
                        continue;
                    }
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .radius(2.0 + bucket as f32)
                            .color(Self::palette_color(0).gamma_multiply(0.7)),
                    );
                }
            });
    }

    /// Bar per category, labeled with its formatted mean.
    pub fn draw_bar_chart(ui: &mut egui::Ui, data: &BarData) {
        let labels: Vec<String> = data.groups.iter().map(|g| g.category.clone()).collect();

        Plot::new("categorical_bar_chart")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(data.category_column.clone())
            .y_axis_label(data.value_column.clone())
            .x_axis_formatter(move |mark, _range| Self::index_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = data
                    .groups
                    .iter()
                    .enumerate()
                    .filter(|(_, g)| !g.mean.is_nan())
                    .map(|(i, g)| Bar::new(i as f64, g.mean).name(&g.category).width(0.6))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(Self::palette_color(0)));

                for (i, group) in data.groups.iter().enumerate() {
                    if group.mean.is_nan() {
                        continue;
                    }
                    let anchor = if group.mean < 0.0 {
                        Align2::CENTER_TOP
                    } else {
                        Align2::CENTER_BOTTOM
                    };
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(i as f64, group.mean),
                            RichText::new(&group.label).size(11.0),
                        )
                        .anchor(anchor),
                    );
                }
            });
    }

    /// Wedge polygons split into pieces of at most a quarter turn so each
    /// polygon stays convex.
    fn wedge_pieces(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
        let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / pieces as f64;
        (0..pieces)
            .map(|p| {
                let from = start + step * p as f64;
                let arc_steps = 16;
                let mut points = vec![[0.0, 0.0]];
                for k in 0..=arc_steps {
                    let angle = from + step * k as f64 / arc_steps as f64;
                    // Clockwise from twelve o'clock.
                    points.push([angle.sin(), angle.cos()]);
                }
                points
            })
            .collect()
    }

    pub fn draw_pie_chart(ui: &mut egui::Ui, data: &PieData) {
        let total = data.total();

        Plot::new("pie_chart")
            .height(PLOT_HEIGHT)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                if total == 0 {
                    return;
                }
                let mut start = 0.0;
                for (i, slice) in data.slices.iter().enumerate() {
                    let share = slice.count as f64 / total as f64;
                    let sweep = share * TAU;
                    let color = Self::palette_color(i);

                    for points in Self::wedge_pieces(start, sweep) {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(points))
                                .fill_color(color)
                                .stroke(Stroke::new(1.0, Color32::WHITE))
                                .name(&slice.label),
                        );
                    }

                    if share >= 0.03 {
                        let mid = start + sweep / 2.0;
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(0.65 * mid.sin(), 0.65 * mid.cos()),
                                RichText::new(format!("{:.1}%", share * 100.0)).size(11.0),
                            )
                            .color(Color32::WHITE)
                            .anchor(Align2::CENTER_CENTER),
                        );
                    }
                    start += sweep;
                }
            });
    }

    /// Monthly means as a line, months along x in ascending order.
    pub fn draw_time_series(ui: &mut egui::Ui, data: &TimeSeriesData) {
        let labels: Vec<String> = data.points.iter().map(|p| p.month.to_string()).collect();

        Plot::new("time_series")
            .height(PLOT_HEIGHT)
            .x_axis_label("year_month")
            .y_axis_label(data.value_column.clone())
            .x_axis_formatter(move |mark, _range| Self::index_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                let points: Vec<[f64; 2]> = data
                    .points
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| !p.mean.is_nan())
                    .map(|(i, p)| [i as f64, p.mean])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .color(Self::palette_color(0))
                        .width(2.0)
                        .name(&data.value_column),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(3.0)
                        .color(Self::palette_color(0)),
                );
            });
    }
}

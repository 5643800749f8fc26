//! Charts module - Chart data and rendering

mod data;
mod labels;
mod plotter;

pub use data::{
    BarData, BarGroup, PieData, PieSlice, ScatterData, ScatterPoint, TimeSeriesData,
    TimeSeriesPoint,
};
pub use labels::format_bar_label;
pub use plotter::ChartPlotter;

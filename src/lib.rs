//! General Dataset Analysis
//!
//! Upload a csv/txt/xlsx/xls table, filter it by its categorical columns and
//! explore the filtered view through statistics and charts. The analysis is a
//! pure pipeline ([`pipeline::compute`]) re-run on every interaction; the
//! [`gui`] module is one front end for it.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod gui;
pub mod pipeline;
pub mod stats;

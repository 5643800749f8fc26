//! Export Module
//! Serializes the filtered view to CSV for download.

use crate::config::DashboardConfig;
use crate::data::Table;
use log::info;
use polars::prelude::*;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to save file: {0}")]
    Io(#[from] std::io::Error),
}

/// A downloadable file: name, MIME type and UTF-8 CSV bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// CSV with a header row and no index column.
    pub fn from_table(table: &Table, config: &DashboardConfig) -> Result<Self, ExportError> {
        let mut df = table.dataframe().clone();
        let mut bytes = Vec::new();
        CsvWriter::new(&mut bytes)
            .include_header(true)
            .finish(&mut df)?;

        Ok(Self {
            file_name: config.export_file_name.clone(),
            mime: config.export_mime.clone(),
            bytes,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, &self.bytes)?;
        info!("Saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}

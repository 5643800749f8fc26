//! Data module - loading, classification, filtering and date coercion
//!
//! ```text
//!  upload (csv / txt / xlsx / xls)
//!        │
//!        ▼
//!   loader      ── decode + parse ──▶ Table
//!   classifier  ── dtypes ──▶ numerical / categorical / date candidates
//!   filter      ── selections ──▶ filtered Table
//!   dates       ── per-column coercion report
//! ```

mod classifier;
pub mod dates;
mod filter;
mod loader;
mod table;

pub use classifier::ColumnClassification;
pub use filter::{apply_filters, FilterOptions, FilterSelection};
pub use loader::{load_upload, FileKind, LoaderError, Upload};
pub use table::{Table, TableError};

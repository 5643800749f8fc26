//! Dataset Loader Module
//! Turns an uploaded file into a Table using Polars (csv/txt) or calamine (xlsx/xls).

use super::table::{Table, TableError};
use crate::config::DashboardConfig;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use encoding_rs::Encoding;
use log::{debug, info};
use polars::prelude::*;
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to load spreadsheet: {0}")]
    SpreadsheetError(#[from] calamine::Error),
    #[error("Unsupported file type '{0}' (expected csv, txt, xlsx or xls)")]
    UnsupportedExtension(String),
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),
    #[error("Uploaded file is empty")]
    Empty,
    #[error("Spreadsheet has no worksheets")]
    NoSheets,
    #[error("Duplicate column name after trimming: '{0}'")]
    DuplicateColumn(String),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Txt,
    Xlsx,
    Xls,
}

impl FileKind {
    pub const EXTENSIONS: [&'static str; 4] = ["csv", "txt", "xlsx", "xls"];

    pub fn from_extension(ext: &str) -> Result<Self, LoaderError> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileKind::Csv),
            "txt" => Ok(FileKind::Txt),
            "xlsx" => Ok(FileKind::Xlsx),
            "xls" => Ok(FileKind::Xls),
            other => Err(LoaderError::UnsupportedExtension(other.to_string())),
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, FileKind::Csv | FileKind::Txt)
    }
}

/// An uploaded file: its declared name and raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an upload from disk (used by the file picker).
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    pub fn kind(&self) -> Result<FileKind, LoaderError> {
        let ext = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        FileKind::from_extension(ext)
    }
}

/// Parse an upload into a Table with trimmed, unique column names.
pub fn load_upload(upload: &Upload, config: &DashboardConfig) -> Result<Table, LoaderError> {
    let kind = upload.kind()?;
    if upload.bytes.is_empty() {
        return Err(LoaderError::Empty);
    }

    let df = if kind.is_text() {
        load_delimited(&upload.bytes, kind, config)?
    } else {
        load_spreadsheet(&upload.bytes)?
    };
    let df = normalize_column_names(&df)?;

    info!(
        "Loaded '{}': {} rows, {} columns",
        upload.file_name,
        df.height(),
        df.width()
    );
    Ok(Table::new(df))
}

fn load_delimited(
    bytes: &[u8],
    kind: FileKind,
    config: &DashboardConfig,
) -> Result<DataFrame, LoaderError> {
    let text = decode_text(bytes, &config.text_encoding)?;

    let separator = match kind {
        FileKind::Txt => sniff_separator(&text),
        _ => b',',
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(config.infer_schema_length))
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(text.into_owned().into_bytes()))
        .finish()?;
    Ok(df)
}

const LATIN1_LABELS: [&str; 5] = ["iso-8859-1", "iso8859-1", "latin1", "latin-1", "l1"];

/// Decode an upload with the configured label. Latin-1 labels map every
/// byte to the code point of the same value; encoding_rs would otherwise
/// resolve them to windows-1252.
fn decode_text<'a>(bytes: &'a [u8], label: &str) -> Result<Cow<'a, str>, LoaderError> {
    let normalized = label.trim().to_ascii_lowercase();
    if LATIN1_LABELS.contains(&normalized.as_str()) {
        return Ok(encoding_rs::mem::decode_latin1(bytes));
    }

    let encoding = Encoding::for_label(normalized.as_bytes())
        .ok_or_else(|| LoaderError::UnknownEncoding(label.to_string()))?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Replaced undecodable bytes while reading as {}", encoding.name());
    }
    Ok(text)
}

/// Tab-separated when the header line has tabs and no commas.
fn sniff_separator(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    if header.contains('\t') && !header.contains(',') {
        b'\t'
    } else {
        b','
    }
}

fn load_spreadsheet(bytes: &[u8]) -> Result<DataFrame, LoaderError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoaderError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or(LoaderError::Empty)?
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(cell, i))
        .collect();
    let body: Vec<&[Data]> = rows.collect();

    let columns: Vec<Column> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Data::Empty))
                .collect();
            spreadsheet_column(name, &cells)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn header_name(cell: &Data, idx: usize) -> String {
    match cell {
        Data::Empty => format!("Unnamed: {}", idx),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build a typed column: Int64 when every non-empty cell is a whole number,
/// Float64 when every non-empty cell is numeric, text otherwise.
fn spreadsheet_column(name: &str, cells: &[&Data]) -> Column {
    let numeric: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            Data::Int(i) => Some(Some(*i as f64)),
            Data::Float(f) => Some(Some(*f)),
            Data::Empty | Data::Error(_) => Some(None),
            _ => None,
        })
        .collect();

    match numeric {
        Some(values) if values.iter().any(Option::is_some) => {
            let all_whole = values
                .iter()
                .flatten()
                .all(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64);
            if all_whole {
                let ints: Vec<Option<i64>> =
                    values.iter().map(|v| v.map(|x| x as i64)).collect();
                Column::new(name.into(), ints)
            } else {
                Column::new(name.into(), values)
            }
        }
        _ => {
            let texts: Vec<Option<String>> = cells.iter().map(|cell| cell_text(cell)).collect();
            Column::new(name.into(), texts)
        }
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64()),
        other => Some(other.to_string()),
    }
}

/// Excel serial date (days since 1899-12-30) as ISO text.
fn excel_serial_to_text(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(serial.trunc() as i64))?;
    let seconds = (serial.fract() * 86_400.0).round() as u32;
    if seconds == 0 {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)?;
    Some(
        NaiveDateTime::new(date, time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}

/// Trim whitespace around column names, rejecting collisions.
fn normalize_column_names(df: &DataFrame) -> Result<DataFrame, LoaderError> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let trimmed = column.name().trim().to_string();
        if !seen.insert(trimmed.clone()) {
            return Err(LoaderError::DuplicateColumn(trimmed));
        }
        let series = column
            .as_materialized_series()
            .clone()
            .with_name(trimmed.as_str().into());
        columns.push(Column::from(series));
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(name: &str, content: &[u8]) -> Result<Table, LoaderError> {
        load_upload(&Upload::new(name, content.to_vec()), &DashboardConfig::default())
    }

    #[test]
    fn test_csv_infers_types_and_trims_names() {
        let table = load("data.csv", b" Region ,Sales\nEast,10\nWest,20.5\n").unwrap();
        assert_eq!(table.column_names(), vec!["Region", "Sales"]);
        let schema = table.schema();
        assert_eq!(schema[0].1, DataType::String);
        assert_eq!(schema[1].1, DataType::Float64);
        assert_eq!(
            table.numeric_values("Sales").unwrap(),
            vec![Some(10.0), Some(20.5)]
        );
    }

    #[test]
    fn test_latin1_text_is_decoded() {
        let table = load("data.csv", b"City,N\nCaf\xe9,1\n").unwrap();
        assert_eq!(
            table.text_values("City").unwrap(),
            vec![Some("Caf\u{e9}".to_string())]
        );
    }

    #[test]
    fn test_latin1_keeps_c1_bytes() {
        let bytes = b"Sym,N\n\x80,1\n";
        let table = load("data.csv", bytes).unwrap();
        assert_eq!(
            table.text_values("Sym").unwrap(),
            vec![Some("\u{80}".to_string())]
        );

        let config = DashboardConfig {
            text_encoding: "windows-1252".to_string(),
            ..Default::default()
        };
        let table = load_upload(&Upload::new("data.csv", bytes.to_vec()), &config).unwrap();
        assert_eq!(
            table.text_values("Sym").unwrap(),
            vec![Some("\u{20ac}".to_string())]
        );
    }

    fn sales_workbook() -> Vec<u8> {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        for (col, name) in [" Region ", "Units", "Sales", "Day", "Note"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *name).unwrap();
        }

        sheet.write_string(1, 0, "East").unwrap();
        sheet.write_number(1, 1, 1.0).unwrap();
        sheet.write_number(1, 2, 10.5).unwrap();
        let day = ExcelDateTime::from_ymd(2023, 3, 15).unwrap();
        sheet.write_datetime_with_format(1, 3, &day, &date_format).unwrap();
        sheet.write_string(1, 4, "a").unwrap();

        sheet.write_string(2, 0, "West").unwrap();
        sheet.write_number(2, 1, 2.0).unwrap();
        sheet.write_number(2, 2, 20.0).unwrap();
        let day = ExcelDateTime::from_ymd(2023, 4, 1).unwrap();
        sheet.write_datetime_with_format(2, 3, &day, &date_format).unwrap();

        // Short row: only the first two cells are filled.
        sheet.write_string(3, 0, "North").unwrap();
        sheet.write_number(3, 1, 3.0).unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_xlsx_workbook_is_typed_per_column() {
        let table = load("Sales.XLSX", &sales_workbook()).unwrap();

        assert_eq!(
            table.column_names(),
            vec!["Region", "Units", "Sales", "Day", "Note"]
        );
        let dtypes: Vec<DataType> = table.schema().into_iter().map(|(_, d)| d).collect();
        assert_eq!(
            dtypes,
            vec![
                DataType::String,
                DataType::Int64,
                DataType::Float64,
                DataType::String,
                DataType::String,
            ]
        );

        assert_eq!(
            table.numeric_values("Units").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
        assert_eq!(
            table.numeric_values("Sales").unwrap(),
            vec![Some(10.5), Some(20.0), None]
        );
        assert_eq!(
            table.text_values("Day").unwrap(),
            vec![
                Some("2023-03-15".to_string()),
                Some("2023-04-01".to_string()),
                None
            ]
        );
        assert_eq!(
            table.text_values("Note").unwrap(),
            vec![Some("a".to_string()), None, None]
        );
    }

    #[test]
    fn test_txt_with_tabs() {
        let table = load("data.txt", b"A\tV\nx\t1\ny\t2\n").unwrap();
        assert_eq!(table.column_names(), vec!["A", "V"]);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(FileKind::from_extension("CSV").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::from_extension("Xls").unwrap(), FileKind::Xls);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load("data.json", b"[]").unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedExtension(ext) if ext == "json"));
    }

    #[test]
    fn test_empty_upload() {
        assert!(matches!(load("data.csv", b"").unwrap_err(), LoaderError::Empty));
    }

    #[test]
    fn test_duplicate_after_trim() {
        let err = load("data.csv", b"a, a\n1,2\n").unwrap_err();
        assert!(matches!(err, LoaderError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_malformed_spreadsheet_is_an_error() {
        let err = load("data.xlsx", b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, LoaderError::SpreadsheetError(_)));
    }

    #[test]
    fn test_spreadsheet_column_typing() {
        let ints = [Data::Int(1), Data::Float(2.0), Data::Empty];
        let refs: Vec<&Data> = ints.iter().collect();
        assert_eq!(spreadsheet_column("n", &refs).dtype(), &DataType::Int64);

        let floats = [Data::Float(1.5), Data::Int(2)];
        let refs: Vec<&Data> = floats.iter().collect();
        assert_eq!(spreadsheet_column("f", &refs).dtype(), &DataType::Float64);

        let mixed = [Data::Int(1), Data::String("x".to_string())];
        let refs: Vec<&Data> = mixed.iter().collect();
        assert_eq!(spreadsheet_column("m", &refs).dtype(), &DataType::String);
    }

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(excel_serial_to_text(45000.0).unwrap(), "2023-03-15");
        assert_eq!(
            excel_serial_to_text(44927.5).unwrap(),
            "2023-01-01 12:00:00"
        );
    }

    #[test]
    fn test_header_placeholder_for_blank_cells() {
        assert_eq!(header_name(&Data::Empty, 3), "Unnamed: 3");
        assert_eq!(header_name(&Data::Int(7), 0), "7");
    }
}

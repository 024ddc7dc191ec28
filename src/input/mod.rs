use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::model::metrics::metric_order;
use crate::model::report::{GROUP_COLUMN, ReportRow};

pub const REPORT_FILE_NAME: &str = "report.csv";

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("report file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot locate program directory: {0}")]
    ProgramDir(#[source] std::io::Error),
    #[error("report is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("malformed report at line {line}: {message}")]
    Malformed { line: u64, message: String },
    #[error("report has no data rows: {0}")]
    Empty(PathBuf),
}

/// Column names every report must carry, in header order.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![GROUP_COLUMN];
    cols.extend(metric_order().iter().map(|m| m.column()));
    cols
}

/// `report.csv` next to the running executable, independent of the working
/// directory.
pub fn default_report_path() -> Result<PathBuf, DataLoadError> {
    let exe = std::env::current_exe().map_err(DataLoadError::ProgramDir)?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(report_path_in(dir))
}

pub fn report_path_in(dir: &Path) -> PathBuf {
    dir.join(REPORT_FILE_NAME)
}

pub fn load_report(path: &Path) -> Result<Vec<ReportRow>, DataLoadError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DataLoadError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(DataLoadError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let rows = read_report(BufReader::new(file))?;
    if rows.is_empty() {
        return Err(DataLoadError::Empty(path.to_path_buf()));
    }
    info!("loaded {} report rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parses report rows from any CSV source. Header-only input yields an empty
/// vector; the caller decides whether that is an error.
pub fn read_report<R: std::io::Read>(reader: R) -> Result<Vec<ReportRow>, DataLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| malformed(&e, 1))?.clone();
    debug!("report header: {:?}", headers);
    check_columns(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<ReportRow>().enumerate() {
        // header is line 1, first record line 2
        let row = result.map_err(|e| malformed(&e, idx as u64 + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

fn check_columns(headers: &csv::StringRecord) -> Result<(), DataLoadError> {
    let missing = required_columns()
        .into_iter()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(str::to_string)
        .collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataLoadError::MissingColumns(missing))
    }
}

fn malformed(err: &csv::Error, fallback_line: u64) -> DataLoadError {
    let line = err.position().map(|p| p.line()).unwrap_or(fallback_line);
    let message = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(field) => format!("field {}: {}", field + 1, err.kind()),
            None => err.kind().to_string(),
        },
        _ => err.to_string(),
    };
    DataLoadError::Malformed { line, message }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;

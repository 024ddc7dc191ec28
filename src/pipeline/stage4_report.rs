use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::model::report::GroupedAggregate;
use crate::report::SummaryData;
use crate::report::json::render_summary_json;
use crate::report::text::render_summary_text;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Stage4Input<'a> {
    pub source: &'a Path,
    pub aggregate: &'a GroupedAggregate,
    pub summary_json: Option<&'a Path>,
}

#[derive(Debug, Clone)]
pub struct Stage4Output {
    pub table: String,
    pub json_path: Option<PathBuf>,
}

pub fn write_reports(input: &Stage4Input<'_>) -> Result<Stage4Output, ReportError> {
    let data = SummaryData::new(input.source.display().to_string(), input.aggregate);
    let table = render_summary_text(&data);

    let json_path = match input.summary_json {
        Some(path) => {
            let json = render_summary_json(&data)?;
            write_text(path, &json)?;
            debug!("{} bytes of summary json", json.len());
            Some(path.to_path_buf())
        }
        None => None,
    };

    Ok(Stage4Output { table, json_path })
}

fn write_text(path: &Path, contents: &str) -> Result<(), ReportError> {
    let io_err = |e: std::io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, contents).map_err(io_err)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_report.rs"]
mod tests;

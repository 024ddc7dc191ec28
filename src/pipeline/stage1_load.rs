use std::path::{Path, PathBuf};

use tracing::info;

use crate::input::{DataLoadError, load_report};
use crate::model::report::ReportRow;

#[derive(Debug, Clone)]
pub struct Stage1Output {
    pub source: PathBuf,
    pub rows: Vec<ReportRow>,
    pub n_groups: usize,
}

pub fn run_stage1(path: &Path) -> Result<Stage1Output, DataLoadError> {
    let rows = load_report(path)?;
    let mut groups = rows
        .iter()
        .filter_map(|r| r.group_key())
        .collect::<Vec<_>>();
    groups.sort_unstable();
    groups.dedup();
    let n_groups = groups.len();
    if n_groups == 0 {
        return Err(DataLoadError::Empty(path.to_path_buf()));
    }
    info!("{} distinct groups in report", n_groups);
    Ok(Stage1Output {
        source: path.to_path_buf(),
        rows,
        n_groups,
    })
}

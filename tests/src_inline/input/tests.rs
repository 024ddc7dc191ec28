use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{DataLoadError, load_report, read_report, report_path_in, required_columns};
use crate::model::metrics::Metric;
use crate::pipeline::stage1_load::run_stage1;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("testqc_chart_input_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

const SAMPLE: &str = "Group,Protection,Refactoring,Feedback,Maintenance\n\
A,0.8,0.6,0.4,0.9\n\
A,0.6,0.8,0.6,0.7\n\
B,0.3,0.2,0.1,0.5\n";

#[test]
fn test_required_columns_order() {
    assert_eq!(
        required_columns(),
        vec!["Group", "Protection", "Refactoring", "Feedback", "Maintenance"]
    );
}

#[test]
fn test_load_report_rows() {
    let dir = make_temp_dir();
    let path = report_path_in(&dir);
    write_file(&path, SAMPLE);

    let rows = load_report(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].group, "A");
    assert_eq!(rows[2].value(Metric::Maintenance), Some(0.5));
}

#[test]
fn test_load_report_missing_file() {
    let dir = make_temp_dir();
    let err = load_report(&dir.join("nope.csv")).unwrap_err();
    assert!(matches!(err, DataLoadError::NotFound(_)));
}

#[test]
fn test_missing_maintenance_column() {
    let csv = "Group,Protection,Refactoring,Feedback\nA,0.1,0.2,0.3\n";
    let err = read_report(csv.as_bytes()).unwrap_err();
    match err {
        DataLoadError::MissingColumns(cols) => assert_eq!(cols, vec!["Maintenance".to_string()]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_all_missing_columns_reported() {
    let csv = "Name,Score\nA,0.1\n";
    let err = read_report(csv.as_bytes()).unwrap_err();
    match err {
        DataLoadError::MissingColumns(cols) => assert_eq!(cols.len(), 5),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_extra_columns_and_reordering_ignored() {
    let csv = "Maintenance,Note,Group,Feedback,Refactoring,Protection\n0.9,x,A,0.4,0.6,0.8\n";
    let rows = read_report(csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value(Metric::Protection), Some(0.8));
    assert_eq!(rows[0].value(Metric::Maintenance), Some(0.9));
}

#[test]
fn test_non_numeric_score_is_malformed() {
    let csv = "Group,Protection,Refactoring,Feedback,Maintenance\nA,0.1,0.2,0.3,0.4\nB,high,0.2,0.3,0.4\n";
    let err = read_report(csv.as_bytes()).unwrap_err();
    match err {
        DataLoadError::Malformed { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_wrong_field_count_is_malformed() {
    let csv = "Group,Protection,Refactoring,Feedback,Maintenance\nA,0.1,0.2\n";
    let err = read_report(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, DataLoadError::Malformed { .. }));
}

#[test]
fn test_empty_cells_and_nan_are_missing() {
    let csv = "Group,Protection,Refactoring,Feedback,Maintenance\nA,,0.2,NaN,0.4\n";
    let rows = read_report(csv.as_bytes()).unwrap();
    assert_eq!(rows[0].value(Metric::Protection), None);
    assert_eq!(rows[0].value(Metric::Refactoring), Some(0.2));
    assert_eq!(rows[0].value(Metric::Feedback), None);
}

#[test]
fn test_fields_are_trimmed() {
    let csv = "Group,Protection,Refactoring,Feedback,Maintenance\nA , 0.5 ,0.2,0.3,0.4\n";
    let rows = read_report(csv.as_bytes()).unwrap();
    assert_eq!(rows[0].group, "A");
    assert_eq!(rows[0].value(Metric::Protection), Some(0.5));
}

#[test]
fn test_header_only_file_is_empty_error() {
    let dir = make_temp_dir();
    let path = report_path_in(&dir);
    write_file(&path, "Group,Protection,Refactoring,Feedback,Maintenance\n");
    let err = load_report(&path).unwrap_err();
    assert!(matches!(err, DataLoadError::Empty(_)));
}

#[test]
fn test_stage1_counts_distinct_groups() {
    let dir = make_temp_dir();
    let path = report_path_in(&dir);
    write_file(&path, SAMPLE);
    let out = run_stage1(&path).unwrap();
    assert_eq!(out.rows.len(), 3);
    assert_eq!(out.n_groups, 2);
    assert_eq!(out.source, path);
}

#[test]
fn test_na_tokens_are_missing() {
    let csv = "Group,Protection,Refactoring,Feedback,Maintenance\n\
A,NA,N/A,null,#N/A\n\
A,None,<NA>,NULL,0.4\n";
    let rows = read_report(csv.as_bytes()).unwrap();
    for &metric in crate::model::metrics::metric_order() {
        assert_eq!(rows[0].value(metric), None);
    }
    assert_eq!(rows[1].value(Metric::Protection), None);
    assert_eq!(rows[1].value(Metric::Maintenance), Some(0.4));
}

#[test]
fn test_blank_group_rows_excluded_from_group_count() {
    let dir = make_temp_dir();
    let path = report_path_in(&dir);
    write_file(
        &path,
        "Group,Protection,Refactoring,Feedback,Maintenance\n,0.1,0.1,0.1,0.1\nA,0.5,0.5,0.5,0.5\n",
    );
    let out = run_stage1(&path).unwrap();
    assert_eq!(out.rows.len(), 2);
    assert_eq!(out.n_groups, 1);
}

#[test]
fn test_only_blank_groups_is_empty_error() {
    let dir = make_temp_dir();
    let path = report_path_in(&dir);
    write_file(
        &path,
        "Group,Protection,Refactoring,Feedback,Maintenance\n,0.1,0.1,0.1,0.1\nNA,0.2,0.2,0.2,0.2\n",
    );
    let err = run_stage1(&path).unwrap_err();
    assert!(matches!(err, DataLoadError::Empty(_)));
}

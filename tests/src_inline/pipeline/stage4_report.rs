use super::*;
use crate::model::report::GroupMeans;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("testqc_chart_report_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn build_aggregate() -> GroupedAggregate {
    GroupedAggregate {
        groups: vec![
            GroupMeans {
                group: "A".to_string(),
                rows: 2,
                means: [Some(0.7), Some(0.7), Some(0.5), Some(0.8)],
            },
            GroupMeans {
                group: "B".to_string(),
                rows: 1,
                means: [Some(0.3), Some(0.2), None, Some(0.5)],
            },
        ],
    }
}

#[test]
fn test_write_reports_without_json() {
    let agg = build_aggregate();
    let out = write_reports(&Stage4Input {
        source: Path::new("report.csv"),
        aggregate: &agg,
        summary_json: None,
    })
    .unwrap();
    assert!(out.json_path.is_none());
    assert!(out.table.contains("Groups: 2"));
}

#[test]
fn test_write_reports_json_file() {
    let dir = make_temp_dir();
    let json_path = dir.join("nested").join("summary.json");
    let agg = build_aggregate();
    let out = write_reports(&Stage4Input {
        source: Path::new("data/report.csv"),
        aggregate: &agg,
        summary_json: Some(&json_path),
    })
    .unwrap();
    assert_eq!(out.json_path.as_deref(), Some(json_path.as_path()));

    let text = fs::read_to_string(&json_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["tool"], "testqc-chart");
    assert_eq!(value["input"], "data/report.csv");
    assert_eq!(value["n_rows"], 3);
    assert_eq!(value["groups"][0]["group"], "A");
    assert_eq!(value["groups"][0]["maintenance"], 0.8);
    assert!(value["groups"][1]["feedback"].is_null());
}

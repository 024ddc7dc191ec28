use super::*;
use crate::model::report::GroupMeans;
use crate::report::text::render_summary_text;

fn build_aggregate() -> GroupedAggregate {
    GroupedAggregate {
        groups: vec![
            GroupMeans {
                group: "Модульные".to_string(),
                rows: 2,
                means: [Some(0.7), Some(0.7), Some(0.5), Some(0.8)],
            },
            GroupMeans {
                group: "e2e".to_string(),
                rows: 1,
                means: [Some(0.3), None, Some(0.1), Some(0.5)],
            },
        ],
    }
}

#[test]
fn test_format_mean() {
    assert_eq!(format_mean(Some(0.5)), "0.500000");
    assert_eq!(format_mean(None), "-");
}

#[test]
fn test_summary_counts_rows() {
    let agg = build_aggregate();
    let data = SummaryData::new("report.csv".to_string(), &agg);
    assert_eq!(data.n_rows, 3);
    assert_eq!(data.tool_name, "testqc-chart");
}

#[test]
fn test_text_table_aligned() {
    let agg = build_aggregate();
    let data = SummaryData::new("report.csv".to_string(), &agg);
    let text = render_summary_text(&data);
    let lines = text.lines().collect::<Vec<_>>();
    let header = lines
        .iter()
        .position(|l| l.starts_with("group"))
        .unwrap();
    let widths = lines[header..]
        .iter()
        .map(|l| l.chars().count())
        .collect::<Vec<_>>();
    assert_eq!(widths.len(), 3);
    assert!(widths.iter().all(|&w| w == widths[0]));
    assert!(lines[header + 1].starts_with("Модульные"));
    assert!(lines[header + 1].contains("0.700000"));
    assert!(lines[header + 2].contains("       -"));
}

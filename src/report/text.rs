use crate::model::metrics::metric_order;
use crate::report::{SummaryData, format_mean};

const GROUP_HEADER: &str = "group";
const ROWS_HEADER: &str = "rows";

pub fn render_summary_text(data: &SummaryData<'_>) -> String {
    let mut out = String::new();

    out.push_str("Test Quality by Group\n");
    out.push_str("=====================\n");
    out.push_str(&format!("Input: {}\n", data.input));
    out.push_str(&format!(
        "Rows: {}  Groups: {}\n\n",
        data.n_rows,
        data.aggregate.len()
    ));

    let group_w = data
        .aggregate
        .groups
        .iter()
        .map(|g| g.group.chars().count())
        .max()
        .unwrap_or(0)
        .max(GROUP_HEADER.len());
    let col_w = metric_order()
        .iter()
        .map(|m| m.column().len())
        .max()
        .unwrap_or(0)
        .max(8);

    out.push_str(&pad_right(GROUP_HEADER, group_w));
    for metric in metric_order() {
        out.push_str("  ");
        out.push_str(&pad_left(metric.column(), col_w));
    }
    out.push_str("  ");
    out.push_str(ROWS_HEADER);
    out.push('\n');

    for g in &data.aggregate.groups {
        out.push_str(&pad_right(&g.group, group_w));
        for &metric in metric_order() {
            out.push_str("  ");
            out.push_str(&pad_left(&format_mean(g.mean(metric)), col_w));
        }
        out.push_str("  ");
        out.push_str(&pad_left(&g.rows.to_string(), ROWS_HEADER.len()));
        out.push('\n');
    }

    out
}

// Widths count chars, not bytes, so Cyrillic group names line up.
fn pad_right(s: &str, width: usize) -> String {
    let n = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(n)))
}

fn pad_left(s: &str, width: usize) -> String {
    let n = s.chars().count();
    format!("{}{}", " ".repeat(width.saturating_sub(n)), s)
}

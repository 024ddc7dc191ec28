pub mod json;
pub mod text;

use crate::model::report::GroupedAggregate;

#[derive(Debug, Clone)]
pub struct SummaryData<'a> {
    pub tool_name: &'static str,
    pub tool_version: &'static str,
    pub input: String,
    pub n_rows: usize,
    pub aggregate: &'a GroupedAggregate,
}

impl<'a> SummaryData<'a> {
    pub fn new(input: String, aggregate: &'a GroupedAggregate) -> Self {
        let n_rows = aggregate.groups.iter().map(|g| g.rows).sum();
        Self {
            tool_name: env!("CARGO_PKG_NAME"),
            tool_version: env!("CARGO_PKG_VERSION"),
            input,
            n_rows,
            aggregate,
        }
    }
}

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}

/// Six decimals, or `-` when the group has no value for the metric.
pub fn format_mean(v: Option<f64>) -> String {
    match v {
        Some(v) => format_f64_6(v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;

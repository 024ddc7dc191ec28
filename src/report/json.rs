use serde::Serialize;

use crate::model::metrics::Metric;
use crate::model::report::GroupMeans;
use crate::report::SummaryData;

#[derive(Debug, Serialize)]
struct SummaryJson<'a> {
    tool: &'a str,
    version: &'a str,
    input: &'a str,
    n_rows: usize,
    groups: Vec<GroupJson<'a>>,
}

#[derive(Debug, Serialize)]
struct GroupJson<'a> {
    group: &'a str,
    rows: usize,
    protection: Option<f64>,
    refactoring: Option<f64>,
    feedback: Option<f64>,
    maintenance: Option<f64>,
}

impl<'a> From<&'a GroupMeans> for GroupJson<'a> {
    fn from(g: &'a GroupMeans) -> Self {
        Self {
            group: &g.group,
            rows: g.rows,
            protection: g.mean(Metric::Protection),
            refactoring: g.mean(Metric::Refactoring),
            feedback: g.mean(Metric::Feedback),
            maintenance: g.mean(Metric::Maintenance),
        }
    }
}

pub fn render_summary_json(data: &SummaryData<'_>) -> serde_json::Result<String> {
    let summary = SummaryJson {
        tool: data.tool_name,
        version: data.tool_version,
        input: &data.input,
        n_rows: data.n_rows,
        groups: data.aggregate.groups.iter().map(GroupJson::from).collect(),
    };
    serde_json::to_string_pretty(&summary)
}

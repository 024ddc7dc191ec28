use std::collections::BTreeMap;

use tracing::debug;

use crate::model::metrics::{METRIC_COUNT, metric_order};
use crate::model::report::{GroupMeans, GroupedAggregate, ReportRow};

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    rows: usize,
    sum: [f64; METRIC_COUNT],
    count: [usize; METRIC_COUNT],
}

/// Arithmetic mean of every metric per group. Missing values and rows with a
/// blank or NA group are skipped; groups come out in ascending key order.
pub fn aggregate(rows: &[ReportRow]) -> GroupedAggregate {
    let mut acc: BTreeMap<&str, Accumulator> = BTreeMap::new();
    let mut dropped = 0usize;
    for row in rows {
        let Some(key) = row.group_key() else {
            dropped += 1;
            continue;
        };
        let entry = acc.entry(key).or_default();
        entry.rows += 1;
        for &metric in metric_order() {
            if let Some(v) = row.value(metric) {
                let idx = metric.index();
                entry.sum[idx] += v;
                entry.count[idx] += 1;
            }
        }
    }

    if dropped > 0 {
        debug!(dropped, "rows without a group key skipped");
    }

    let groups = acc
        .into_iter()
        .map(|(group, a)| {
            let mut means = [None; METRIC_COUNT];
            for idx in 0..METRIC_COUNT {
                if a.count[idx] > 0 {
                    means[idx] = Some(a.sum[idx] / a.count[idx] as f64);
                }
            }
            debug!(group, rows = a.rows, ?means, "group aggregated");
            GroupMeans {
                group: group.to_string(),
                rows: a.rows,
                means,
            }
        })
        .collect();

    GroupedAggregate { groups }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_aggregate.rs"]
mod tests;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::model::metrics::{METRIC_COUNT, Metric};

pub const GROUP_COLUMN: &str = "Group";

/// Cell spellings read as a missing value, same set as pandas `read_csv`.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na_token(cell: &str) -> bool {
    NA_TOKENS.contains(&cell.trim())
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(cell) if !is_na_token(&cell) => cell
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid score {:?}: {}", cell, e))),
        _ => Ok(None),
    }
}

/// One observation from `report.csv`. Missing cells deserialize to `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Group")]
    pub group: String,
    #[serde(rename = "Protection", deserialize_with = "deserialize_score")]
    pub protection: Option<f64>,
    #[serde(rename = "Refactoring", deserialize_with = "deserialize_score")]
    pub refactoring: Option<f64>,
    #[serde(rename = "Feedback", deserialize_with = "deserialize_score")]
    pub feedback: Option<f64>,
    #[serde(rename = "Maintenance", deserialize_with = "deserialize_score")]
    pub maintenance: Option<f64>,
}

impl ReportRow {
    #[cfg(test)]
    pub fn new(group: &str, values: [f64; METRIC_COUNT]) -> Self {
        Self {
            group: group.to_string(),
            protection: Some(values[0]),
            refactoring: Some(values[1]),
            feedback: Some(values[2]),
            maintenance: Some(values[3]),
        }
    }

    /// Grouping key, or `None` for a blank or NA group cell. Such rows are
    /// left out of the aggregate.
    pub fn group_key(&self) -> Option<&str> {
        if is_na_token(&self.group) {
            None
        } else {
            Some(self.group.as_str())
        }
    }

    /// Value for `metric`; `NaN` counts as missing.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let v = match metric {
            Metric::Protection => self.protection,
            Metric::Refactoring => self.refactoring,
            Metric::Feedback => self.feedback,
            Metric::Maintenance => self.maintenance,
        };
        v.filter(|x| !x.is_nan())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeans {
    pub group: String,
    pub rows: usize,
    /// Indexed by `Metric::index`; `None` when the group has no value for
    /// that metric.
    pub means: [Option<f64>; METRIC_COUNT],
}

impl GroupMeans {
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means[metric.index()]
    }
}

/// Per-group means, ascending by group key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedAggregate {
    pub groups: Vec<GroupMeans>,
}

impl GroupedAggregate {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, group: &str) -> Option<&GroupMeans> {
        self.groups
            .binary_search_by(|g| g.group.as_str().cmp(group))
            .ok()
            .map(|idx| &self.groups[idx])
    }

    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.group.as_str()).collect()
    }
}

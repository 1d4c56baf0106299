//! Input records, as they appear in the JSON dumps.
//!
//! Unknown fields are ignored so full dumps (with authors, dates, etc.) load
//! as-is. Fields the builder may skip are `Option`; list fields accept both a
//! missing key and an explicit `null`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `Some(text)` when the option holds something other than whitespace.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// One entry of the papers-with-abstracts dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: Option<String>,
    pub arxiv_id: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub url_pdf: Option<String>,
    pub proceeding: Option<String>,
}

/// One entry of the paper ↔ repository links dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeLinkRecord {
    pub paper_title: Option<String>,
    pub repo_url: Option<String>,
}

impl CodeLinkRecord {
    pub fn new(paper_title: &str, repo_url: &str) -> Self {
        Self {
            paper_title: Some(paper_title.to_string()),
            repo_url: Some(repo_url.to_string()),
        }
    }
}

/// A node of the evaluation-tables tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub datasets: Vec<DatasetRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subtasks: Vec<TaskRecord>,
}

/// A dataset a task is evaluated on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub dataset: Option<String>,
    pub description: Option<String>,
    pub sota: Option<SotaTable>,
}

/// The state-of-the-art results table of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SotaTable {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metrics: Vec<String>,
    #[serde(default, alias = "rows", deserialize_with = "null_as_empty")]
    pub sota_rows: Vec<SotaRow>,
}

/// One row of a results table: a model, its paper, and metric → value pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SotaRow {
    pub model_name: Option<String>,
    pub paper_title: Option<String>,
    /// Metric name → cell, in document order.
    #[serde(default)]
    pub metrics: Map<String, Value>,
}

/// Render a metric cell as literal text. `null` and empty strings yield `None`.
pub fn metric_value_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A node of the research-field taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchField {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subfields: Vec<ResearchField>,
}

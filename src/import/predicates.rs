//! Well-known predicate labels.
//!
//! Predicates are created lazily, the first time the builder links with one,
//! and cached for the rest of the run.

use super::model::PaperRecord;

// Paper metadata
pub const HAS_ARXIV_ID: &str = "has arxiv id";
pub const HAS_TITLE: &str = "has title";
pub const HAS_ABSTRACT: &str = "has abstract";
pub const HAS_URL: &str = "has url";

// Code links
pub const HAS_IMPLEMENTATION: &str = "has implementation";
pub const HAS_REPO_URL: &str = "has repo url";

// Tasks and datasets
pub const HAS_DESCRIPTION: &str = "has description";
pub const HAS_CATEGORY: &str = "has category";
pub const HAS_DATASET: &str = "has dataset";
pub const HAS_SUBTASK: &str = "has subtask";

// Evaluations
pub const HAS_EVALUATION: &str = "has evaluation";
pub const HAS_RESULT: &str = "has result";
pub const HAS_METRIC: &str = "has metric";
pub const HAS_VALUE: &str = "has value";
pub const ON_MODEL: &str = "on model";
pub const USING_DATASET: &str = "using dataset";

// Taxonomy
pub const HAS_SUBFIELD: &str = "has subfield";

/// Optional paper fields paired with the predicate each one is linked by,
/// in the order the literals are written.
pub fn paper_fields(paper: &PaperRecord) -> [(&'static str, Option<&str>); 4] {
    [
        (HAS_ARXIV_ID, paper.arxiv_id.as_deref()),
        (HAS_TITLE, paper.proceeding.as_deref()),
        (HAS_ABSTRACT, paper.abstract_text.as_deref()),
        (HAS_URL, paper.url_pdf.as_deref()),
    ]
}

/// Label of the implementation resource for a paper.
pub fn implementation_label(title: &str) -> String {
    format!("(Implementation) {title}")
}

/// Label of the evaluation resource for a paper.
pub fn evaluation_label(title: &str) -> String {
    format!("(Evaluation) {title}")
}

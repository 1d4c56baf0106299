//! Rich diagnostic error types for the importer.
//!
//! Each concern defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type for an import run.
///
/// Each variant wraps a concern-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("request to {endpoint} failed: {message}")]
    #[diagnostic(
        code(pgi::store::request),
        help(
            "The graph API could not be reached. Check `base_url` in the config \
             (or --base-url) and that the server is running."
        )
    )]
    Request { endpoint: String, message: String },

    #[error("{endpoint} answered {status} instead of 201 Created")]
    #[diagnostic(
        code(pgi::store::status),
        help(
            "The graph API rejected the create call. The response body is logged \
             at warn level; a 401/403 usually means the API needs credentials."
        )
    )]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {endpoint}: {message}")]
    #[diagnostic(
        code(pgi::store::response),
        help("The response body must be JSON with at least an `id` field. Server version mismatch?")
    )]
    Response { endpoint: String, message: String },

    #[error("store refused label \"{label}\"")]
    #[diagnostic(
        code(pgi::store::refused),
        help("The in-memory store was configured to reject this label.")
    )]
    Refused { label: String },
}

// ---------------------------------------------------------------------------
// Record errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RecordError {
    #[error("no code-link record references paper \"{title}\"")]
    #[diagnostic(
        code(pgi::record::no_code_link),
        help(
            "The deferred pass could not find a code-link record for this title. \
             Pass the same links file that produced the unresolved title."
        )
    )]
    NoMatchingCodeLink { title: String },

    #[error("{kind} \"{label}\" is nested deeper than the limit of {limit}")]
    #[diagnostic(
        code(pgi::record::depth_exceeded),
        help(
            "The subtree below this node was skipped. Raise the matching depth \
             limit in the config if the input is genuinely this deep."
        )
    )]
    DepthExceeded {
        kind: &'static str,
        label: String,
        limit: usize,
    },

    #[error("{record} record is missing required field `{field}`")]
    #[diagnostic(
        code(pgi::record::missing_field),
        help("The record was skipped. Check the input file for incomplete entries.")
    )]
    MissingField { record: &'static str, field: &'static str },
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("failed to read input file: {path}")]
    #[diagnostic(
        code(pgi::input::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse input file {path}: {message}")]
    #[diagnostic(
        code(pgi::input::parse),
        help("The file must contain a single JSON array of records.")
    )]
    Parse { path: String, message: String },
}

/// Convenience result type for import operations.
pub type ImportResult<T> = std::result::Result<T, ImportError>;

// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # paper-graph-import
//!
//! Replays research-metadata dumps (papers, code links, evaluation tables,
//! research-field taxonomy) as create calls against a resources / literals /
//! predicates / statements graph API.
//!
//! ## Architecture
//!
//! - **Store** (`store`): the [`GraphStore`](store::GraphStore) trait, with a
//!   blocking HTTP backend and an in-memory recording backend
//! - **Registry** (`registry`): label-keyed get-or-create tables
//! - **Import** (`import`): the graph builder, one pass per record kind, and
//!   the pipeline that runs them in order
//! - **Config** (`config`): TOML run settings
//!
//! ## Library usage
//!
//! ```no_run
//! use paper_graph_import::config::ImportConfig;
//! use paper_graph_import::import::{Importer, PaperRecord};
//! use paper_graph_import::store::MemoryStore;
//!
//! let mut importer = Importer::new(MemoryStore::new(), &ImportConfig::default());
//! importer
//!     .import_papers(&[PaperRecord {
//!         title: Some("Attention Is All You Need".into()),
//!         arxiv_id: Some("1706.03762".into()),
//!         ..Default::default()
//!     }])
//!     .unwrap();
//! let (report, _store) = importer.finish();
//! println!("{report}");
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod registry;
pub mod store;
pub mod thing;

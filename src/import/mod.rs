//! Import passes: JSON records in, graph statements out.
//!
//! [`GraphBuilder`] holds the run-scoped lookup tables and implements one
//! method per record kind. [`Importer`] drives a builder over loaded inputs
//! and produces an [`ImportReport`].

pub mod builder;
pub mod code;
pub mod evaluation;
pub mod field;
pub mod loader;
pub mod model;
pub mod paper;
pub mod pipeline;
pub mod predicates;

pub use builder::{BuilderOptions, GraphBuilder, LinkPolicy, Table};
pub use code::CodeLinkOutcome;
pub use evaluation::TaskTreeOutcome;
pub use field::FieldTreeOutcome;
pub use loader::{ImportInputs, InputPaths, load_records};
pub use model::{CodeLinkRecord, DatasetRecord, PaperRecord, ResearchField, SotaRow, SotaTable, TaskRecord};
pub use pipeline::{ImportReport, Importer, Pass, PassStats, RecordFailure};

//! Graph store backends.
//!
//! The importer talks to a resources/literals/predicates/statements API
//! through the [`GraphStore`] trait. Two backends implement it:
//!
//! - [`HttpStore`]: blocking `ureq` client for the remote graph API
//! - [`MemoryStore`]: in-process recording store for dry runs and tests

pub mod http;
pub mod memory;

pub use http::HttpStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::thing::{ObjectRef, ThingId};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Graph-mutation calls the builder issues.
///
/// Every method is one create round trip. Implementations return the id the
/// store assigned, or an error; they never hand back a placeholder id.
pub trait GraphStore {
    /// Create a labeled resource node.
    fn create_resource(&mut self, label: &str) -> StoreResult<ThingId>;

    /// Create a literal value node.
    fn create_literal(&mut self, label: &str) -> StoreResult<ThingId>;

    /// Create a named predicate.
    fn create_predicate(&mut self, label: &str) -> StoreResult<ThingId>;

    /// Create a statement `(subject, predicate, object)`.
    fn create_statement(
        &mut self,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ObjectRef,
    ) -> StoreResult<ThingId>;

    /// Create calls issued so far.
    fn call_count(&self) -> usize;
}

impl<S: GraphStore + ?Sized> GraphStore for &mut S {
    fn create_resource(&mut self, label: &str) -> StoreResult<ThingId> {
        (**self).create_resource(label)
    }

    fn create_literal(&mut self, label: &str) -> StoreResult<ThingId> {
        (**self).create_literal(label)
    }

    fn create_predicate(&mut self, label: &str) -> StoreResult<ThingId> {
        (**self).create_predicate(label)
    }

    fn create_statement(
        &mut self,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ObjectRef,
    ) -> StoreResult<ThingId> {
        (**self).create_statement(subject, predicate, object)
    }

    fn call_count(&self) -> usize {
        (**self).call_count()
    }
}

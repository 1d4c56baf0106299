//! In-memory graph store.
//!
//! Records every node and statement the builder creates, assigning ids from a
//! single counter (`R<n>`, `L<n>`, `P<n>`, `S<n>`). Used for `--dry-run` and as
//! the test double for the builder. Statements are checked for referential
//! integrity the way the remote API checks them.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{GraphStore, StoreResult};
use crate::error::StoreError;
use crate::thing::{ObjectClass, ObjectRef, ThingId};

/// Kind of node held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Resource,
    Literal,
    Predicate,
}

impl NodeKind {
    fn prefix(self) -> char {
        match self {
            NodeKind::Resource => 'R',
            NodeKind::Literal => 'L',
            NodeKind::Predicate => 'P',
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            NodeKind::Resource => "/resources/",
            NodeKind::Literal => "/literals/",
            NodeKind::Predicate => "/predicates/",
        }
    }
}

/// A node created through the store.
#[derive(Debug, Clone, Serialize)]
pub struct StoredNode {
    pub id: ThingId,
    pub kind: NodeKind,
    pub label: String,
}

/// A statement created through the store.
#[derive(Debug, Clone, Serialize)]
pub struct StoredStatement {
    pub id: ThingId,
    pub subject: ThingId,
    pub predicate: ThingId,
    pub object: ObjectRef,
}

/// Recording graph store living entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next: u64,
    nodes: Vec<StoredNode>,
    index: HashMap<ThingId, usize>,
    statements: Vec<StoredStatement>,
    rejected: HashSet<String>,
    failing_statements: usize,
    calls: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every create call for `label` fail, as a non-201 would.
    pub fn reject_label(&mut self, label: impl Into<String>) {
        self.rejected.insert(label.into());
    }

    /// Make the next `n` statement creates fail with a 500.
    pub fn fail_next_statements(&mut self, n: usize) {
        self.failing_statements = n;
    }

    fn allocate(&mut self, prefix: char) -> ThingId {
        self.next += 1;
        ThingId::new(format!("{prefix}{}", self.next)).expect("prefixed id is never empty")
    }

    fn create_node(&mut self, kind: NodeKind, label: &str) -> StoreResult<ThingId> {
        self.calls += 1;
        if self.rejected.contains(label) {
            tracing::warn!(endpoint = kind.endpoint(), label, "memory store refused label");
            return Err(StoreError::Refused {
                label: label.to_string(),
            });
        }
        let id = self.allocate(kind.prefix());
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(StoredNode {
            id: id.clone(),
            kind,
            label: label.to_string(),
        });
        Ok(id)
    }

    fn expect_kind(&self, id: &ThingId, kind: NodeKind) -> StoreResult<()> {
        match self.node(id) {
            Some(node) if node.kind == kind => Ok(()),
            Some(node) => Err(StoreError::UnexpectedStatus {
                endpoint: "/statements/".into(),
                status: 400,
                body: format!("{id} is a {:?}, expected {kind:?}", node.kind),
            }),
            None => Err(StoreError::UnexpectedStatus {
                endpoint: "/statements/".into(),
                status: 404,
                body: format!("{id} not found"),
            }),
        }
    }

    /// Look up a node by id.
    pub fn node(&self, id: &ThingId) -> Option<&StoredNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Label of a node, if it exists.
    pub fn label_of(&self, id: &ThingId) -> Option<&str> {
        self.node(id).map(|n| n.label.as_str())
    }

    /// All nodes of one kind, in creation order.
    pub fn nodes(&self, kind: NodeKind) -> impl Iterator<Item = &StoredNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    /// Number of nodes of one kind.
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes(kind).count()
    }

    /// Resource nodes carrying exactly this label.
    pub fn resources_labeled<'a>(&'a self, label: &'a str) -> Vec<&'a StoredNode> {
        self.nodes(NodeKind::Resource)
            .filter(|n| n.label == label)
            .collect()
    }

    /// All statements, in creation order.
    pub fn statements(&self) -> &[StoredStatement] {
        &self.statements
    }

    /// Statements whose predicate carries `label`.
    pub fn statements_with(&self, predicate_label: &str) -> Vec<&StoredStatement> {
        self.statements
            .iter()
            .filter(|s| self.label_of(&s.predicate) == Some(predicate_label))
            .collect()
    }

    /// Objects reachable from `subject` over the predicate labeled `predicate_label`.
    pub fn objects_of(&self, subject: &ThingId, predicate_label: &str) -> Vec<&ObjectRef> {
        self.statements
            .iter()
            .filter(|s| &s.subject == subject && self.label_of(&s.predicate) == Some(predicate_label))
            .map(|s| &s.object)
            .collect()
    }
}

impl GraphStore for MemoryStore {
    fn create_resource(&mut self, label: &str) -> StoreResult<ThingId> {
        self.create_node(NodeKind::Resource, label)
    }

    fn create_literal(&mut self, label: &str) -> StoreResult<ThingId> {
        self.create_node(NodeKind::Literal, label)
    }

    fn create_predicate(&mut self, label: &str) -> StoreResult<ThingId> {
        self.create_node(NodeKind::Predicate, label)
    }

    fn create_statement(
        &mut self,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ObjectRef,
    ) -> StoreResult<ThingId> {
        self.calls += 1;
        if self.failing_statements > 0 {
            self.failing_statements -= 1;
            tracing::warn!(%subject, %predicate, "memory store failed statement");
            return Err(StoreError::UnexpectedStatus {
                endpoint: "/statements/".into(),
                status: 500,
                body: "statement create failed".into(),
            });
        }
        self.expect_kind(subject, NodeKind::Resource)?;
        self.expect_kind(predicate, NodeKind::Predicate)?;
        let object_kind = match object.class {
            ObjectClass::Literal => NodeKind::Literal,
            ObjectClass::Resource => NodeKind::Resource,
        };
        self.expect_kind(&object.id, object_kind)?;

        let id = self.allocate('S');
        self.statements.push(StoredStatement {
            id: id.clone(),
            subject: subject.clone(),
            predicate: predicate.clone(),
            object: object.clone(),
        });
        Ok(id)
    }

    /// Create calls attempted, failed ones included.
    fn call_count(&self) -> usize {
        self.calls
    }
}

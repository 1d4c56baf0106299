//! Label-keyed lookup tables: label → store id, scoped to one run.
//!
//! A [`LabelCache`] is the deduplicating factory behind every get-or-create in
//! the builder. Two things with equal labels (after [`LabelPolicy`]
//! normalization) collapse to one node; that is the dedup rule, not a bug.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::thing::ThingId;

/// How labels are compared when deduplicating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPolicy {
    /// Labels must be byte-equal to collapse.
    #[default]
    Exact,
    /// Labels are lowercased before lookup.
    CaseInsensitive,
}

impl LabelPolicy {
    fn normalize(self, label: &str) -> String {
        match self {
            LabelPolicy::Exact => label.to_string(),
            LabelPolicy::CaseInsensitive => label.to_lowercase(),
        }
    }
}

/// Outcome of a get-or-create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub id: ThingId,
    /// `true` when the factory ran and the id is fresh.
    pub created: bool,
}

/// A run-scoped label → id table.
#[derive(Debug, Default)]
pub struct LabelCache {
    policy: LabelPolicy,
    entries: HashMap<String, ThingId>,
}

impl LabelCache {
    /// Create an empty table using the given policy.
    pub fn new(policy: LabelPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    /// Look up an id by label.
    pub fn get(&self, label: &str) -> Option<&ThingId> {
        self.entries.get(&self.policy.normalize(label))
    }

    /// Whether a label is registered.
    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    /// Register (or overwrite) a label. Returns the id it replaced, if any.
    pub fn insert(&mut self, label: &str, id: ThingId) -> Option<ThingId> {
        self.entries.insert(self.policy.normalize(label), id)
    }

    /// Return the cached id for `label`, or run `create` once and cache its result.
    ///
    /// A failing factory leaves the table untouched.
    pub fn get_or_create<E, F>(&mut self, label: &str, create: F) -> Result<Resolved, E>
    where
        F: FnOnce(&str) -> Result<ThingId, E>,
    {
        let key = self.policy.normalize(label);
        if let Some(id) = self.entries.get(&key) {
            return Ok(Resolved {
                id: id.clone(),
                created: false,
            });
        }

        let id = create(label)?;
        self.entries.insert(key, id.clone());
        Ok(Resolved { id, created: true })
    }

    /// Drop a label. Returns the id it mapped to, if any.
    pub fn remove(&mut self, label: &str) -> Option<ThingId> {
        self.entries.remove(&self.policy.normalize(label))
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ThingId {
        ThingId::new(raw).unwrap()
    }

    #[test]
    fn get_or_create_runs_factory_once() {
        let mut cache = LabelCache::new(LabelPolicy::Exact);
        let mut calls = 0;

        let first = cache
            .get_or_create::<(), _>("has url", |_| {
                calls += 1;
                Ok(id("P1"))
            })
            .unwrap();
        assert!(first.created);

        let second = cache
            .get_or_create::<(), _>("has url", |_| {
                calls += 1;
                Ok(id("P2"))
            })
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.id, first.id);
        assert_eq!(calls, 1);
    }

    #[test]
    fn failing_factory_caches_nothing() {
        let mut cache = LabelCache::new(LabelPolicy::Exact);
        let err = cache.get_or_create("Accuracy", |_| Err("down"));
        assert_eq!(err, Err("down"));
        assert!(!cache.contains("Accuracy"));
        assert!(cache.is_empty());
    }

    #[test]
    fn exact_policy_is_case_sensitive() {
        let mut cache = LabelCache::new(LabelPolicy::Exact);
        cache.insert("ImageNet", id("R1"));
        assert!(cache.get("imagenet").is_none());
        assert_eq!(cache.get("ImageNet"), Some(&id("R1")));
    }

    #[test]
    fn case_insensitive_policy_collapses_labels() {
        let mut cache = LabelCache::new(LabelPolicy::CaseInsensitive);
        cache.insert("ImageNet", id("R1"));
        assert_eq!(cache.get("IMAGENET"), Some(&id("R1")));

        let hit = cache
            .get_or_create::<(), _>("imagenet", |_| panic!("should hit the cache"))
            .unwrap();
        assert_eq!(hit.id, id("R1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn removed_label_is_created_again() {
        let mut cache = LabelCache::new(LabelPolicy::CaseInsensitive);
        cache.insert("ImageNet", id("R1"));
        assert_eq!(cache.remove("IMAGENET"), Some(id("R1")));
        assert!(cache.remove("ImageNet").is_none());

        let again = cache
            .get_or_create::<(), _>("ImageNet", |_| Ok(id("R2")))
            .unwrap();
        assert!(again.created);
        assert_eq!(again.id, id("R2"));
    }

    #[test]
    fn insert_reports_replaced_id() {
        let mut cache = LabelCache::new(LabelPolicy::Exact);
        assert!(cache.insert("A", id("R1")).is_none());
        assert_eq!(cache.insert("A", id("R2")), Some(id("R1")));
        assert_eq!(cache.get("A"), Some(&id("R2")));
    }
}

//! The graph-building context.
//!
//! A [`GraphBuilder`] owns the store handle and every run-scoped lookup table.
//! One builder is one run: tables start empty and are dropped with it.

use crate::config::ImportConfig;
use crate::error::ImportResult;
use crate::registry::{LabelCache, LabelPolicy, Resolved};
use crate::store::GraphStore;
use crate::thing::{ObjectRef, ThingId};

/// When the paper → implementation link is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkPolicy {
    /// Only when the implementation resource is created.
    #[default]
    FirstCreation,
    /// On every code-link record for the paper.
    EveryCall,
}

/// Builder settings, taken from [`ImportConfig`].
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    pub link_policy: LinkPolicy,
    pub label_policy: LabelPolicy,
    pub result_seed: u64,
    pub max_task_depth: usize,
    pub max_field_depth: usize,
    pub taxonomy_root: Option<String>,
    pub structure_links: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for BuilderOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            link_policy: config.link_policy,
            label_policy: config.label_policy,
            result_seed: config.result_seed,
            max_task_depth: config.max_task_depth,
            max_field_depth: config.max_field_depth,
            taxonomy_root: config
                .taxonomy_root
                .clone()
                .filter(|root| !root.trim().is_empty()),
            structure_links: config.structure_links,
        }
    }
}

/// Monotonic `Res_<n>` label source.
#[derive(Debug, Clone)]
pub struct ResultLabels {
    next: u64,
}

impl ResultLabels {
    pub fn starting_at(seed: u64) -> Self {
        Self { next: seed }
    }

    /// The number the next label will carry.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Hand out the next label.
    pub fn next_label(&mut self) -> String {
        let n = self.next;
        self.next += 1;
        format!("Res_{n}")
    }
}

/// Which lookup table a get-or-create goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Predicates,
    Resources,
    Implementations,
    Tasks,
    Categories,
    Datasets,
    Metrics,
    Models,
    Evaluations,
    Fields,
}

/// Run-scoped label → id tables.
#[derive(Debug)]
pub struct Tables {
    /// Predicate label → predicate id.
    pub predicates: LabelCache,
    /// Paper title → paper resource id.
    pub resources: LabelCache,
    /// Paper title → implementation resource id.
    pub implementations: LabelCache,
    pub tasks: LabelCache,
    pub categories: LabelCache,
    pub datasets: LabelCache,
    pub metrics: LabelCache,
    pub models: LabelCache,
    /// Paper title → evaluation resource id.
    pub evaluations: LabelCache,
    pub fields: LabelCache,
}

impl Tables {
    fn new(policy: LabelPolicy) -> Self {
        Self {
            predicates: LabelCache::new(policy),
            resources: LabelCache::new(policy),
            implementations: LabelCache::new(policy),
            tasks: LabelCache::new(policy),
            categories: LabelCache::new(policy),
            datasets: LabelCache::new(policy),
            metrics: LabelCache::new(policy),
            models: LabelCache::new(policy),
            evaluations: LabelCache::new(policy),
            fields: LabelCache::new(policy),
        }
    }

    pub fn get(&self, table: Table) -> &LabelCache {
        match table {
            Table::Predicates => &self.predicates,
            Table::Resources => &self.resources,
            Table::Implementations => &self.implementations,
            Table::Tasks => &self.tasks,
            Table::Categories => &self.categories,
            Table::Datasets => &self.datasets,
            Table::Metrics => &self.metrics,
            Table::Models => &self.models,
            Table::Evaluations => &self.evaluations,
            Table::Fields => &self.fields,
        }
    }

    fn get_mut(&mut self, table: Table) -> &mut LabelCache {
        match table {
            Table::Predicates => &mut self.predicates,
            Table::Resources => &mut self.resources,
            Table::Implementations => &mut self.implementations,
            Table::Tasks => &mut self.tasks,
            Table::Categories => &mut self.categories,
            Table::Datasets => &mut self.datasets,
            Table::Metrics => &mut self.metrics,
            Table::Models => &mut self.models,
            Table::Evaluations => &mut self.evaluations,
            Table::Fields => &mut self.fields,
        }
    }
}

/// Builds the statement graph for one run against a [`GraphStore`].
pub struct GraphBuilder<S> {
    pub(super) store: S,
    pub(super) options: BuilderOptions,
    pub(super) tables: Tables,
    pub(super) not_found: Vec<String>,
    pub(super) results: ResultLabels,
}

impl<S: GraphStore> GraphBuilder<S> {
    /// Start a run with empty tables.
    pub fn new(store: S, options: BuilderOptions) -> Self {
        Self {
            tables: Tables::new(options.label_policy),
            results: ResultLabels::starting_at(options.result_seed),
            not_found: Vec::new(),
            store,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Paper titles that had no resource when their code link arrived.
    pub fn not_found(&self) -> &[String] {
        &self.not_found
    }

    /// Number the next `Res_<n>` result label will carry.
    pub fn next_result_number(&self) -> u64 {
        self.results.peek()
    }

    /// Id of the paper resource registered under `title`.
    pub fn paper_id(&self, title: &str) -> Option<&ThingId> {
        self.tables.resources.get(title)
    }

    /// Get-or-create a resource labeled `label` through `table`.
    pub fn resource_in(&mut self, table: Table, label: &str) -> ImportResult<Resolved> {
        self.resource_in_as(table, label, str::to_string)
    }

    /// Like [`resource_in`](Self::resource_in), but the created resource is
    /// labeled `render(key)` while the table stays keyed by `key`.
    pub fn resource_in_as(
        &mut self,
        table: Table,
        key: &str,
        render: impl FnOnce(&str) -> String,
    ) -> ImportResult<Resolved> {
        let store = &mut self.store;
        let resolved = self
            .tables
            .get_mut(table)
            .get_or_create(key, |key| store.create_resource(&render(key)))?;
        if resolved.created {
            tracing::trace!(?table, key, id = %resolved.id, "created resource");
        }
        Ok(resolved)
    }

    /// Settle the links written right after `key` was created in `table`.
    ///
    /// On failure the key is dropped from the table, so the next record for it
    /// creates a fresh node and writes its first-creation links again.
    pub fn settle_created<T>(&mut self, table: Table, key: &str, links: ImportResult<T>) -> ImportResult<T> {
        if links.is_err() {
            if let Some(id) = self.tables.get_mut(table).remove(key) {
                tracing::debug!(?table, key, %id, "first-creation links failed; forgetting node");
            }
        }
        links
    }

    /// Get-or-create a predicate by label.
    pub fn predicate(&mut self, label: &str) -> ImportResult<ThingId> {
        let store = &mut self.store;
        let resolved = self
            .tables
            .predicates
            .get_or_create(label, |label| store.create_predicate(label))?;
        Ok(resolved.id)
    }

    /// Create a literal holding `value` and link `subject` to it.
    pub fn link_literal(&mut self, subject: &ThingId, predicate: &str, value: &str) -> ImportResult<ThingId> {
        let predicate = self.predicate(predicate)?;
        let literal = self.store.create_literal(value)?;
        self.store
            .create_statement(subject, &predicate, &ObjectRef::literal(literal.clone()))?;
        Ok(literal)
    }

    /// Link `subject` to an existing resource.
    pub fn link_resource(&mut self, subject: &ThingId, predicate: &str, object: &ThingId) -> ImportResult<ThingId> {
        let predicate = self.predicate(predicate)?;
        Ok(self
            .store
            .create_statement(subject, &predicate, &ObjectRef::resource(object.clone()))?)
    }
}

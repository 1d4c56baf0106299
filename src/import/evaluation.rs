//! Task, dataset and evaluation subgraph.
//!
//! Task trees are walked with an explicit stack, so input depth never turns
//! into call-stack depth. Nodes below `max_task_depth` are skipped along with
//! their subtrees and reported.

use super::builder::{GraphBuilder, Table};
use super::model::{metric_value_label, non_blank, DatasetRecord, SotaRow, TaskRecord};
use super::predicates::{
    evaluation_label, HAS_CATEGORY, HAS_DATASET, HAS_DESCRIPTION, HAS_EVALUATION, HAS_METRIC, HAS_RESULT,
    HAS_SUBTASK, HAS_VALUE, ON_MODEL, USING_DATASET,
};
use crate::error::{ImportResult, RecordError};
use crate::store::GraphStore;
use crate::thing::ThingId;

/// Counts for one task tree, plus what had to be skipped.
#[derive(Debug, Default)]
pub struct TaskTreeOutcome {
    pub tasks: usize,
    pub datasets: usize,
    pub results: usize,
    /// Malformed or too-deep parts of the tree that were left out.
    pub skipped: Vec<RecordError>,
}

impl TaskTreeOutcome {
    fn skip(&mut self, error: RecordError) {
        tracing::warn!(%error, "skipping part of task tree");
        self.skipped.push(error);
    }
}

impl<S: GraphStore> GraphBuilder<S> {
    /// Add a task, its datasets and results, and all of its subtasks.
    ///
    /// Store failures abort the tree. Missing names and depth overruns only
    /// skip the affected node and end up in [`TaskTreeOutcome::skipped`].
    pub fn add_task_tree(&mut self, root: &TaskRecord) -> ImportResult<TaskTreeOutcome> {
        let mut outcome = TaskTreeOutcome::default();
        let limit = self.options.max_task_depth;
        let mut stack: Vec<(&TaskRecord, usize, Option<ThingId>)> = vec![(root, 1, None)];

        while let Some((task, depth, parent)) = stack.pop() {
            let Some(name) = non_blank(&task.task) else {
                outcome.skip(RecordError::MissingField {
                    record: "task",
                    field: "task",
                });
                continue;
            };
            if depth > limit {
                outcome.skip(RecordError::DepthExceeded {
                    kind: "task",
                    label: name.to_string(),
                    limit,
                });
                continue;
            }

            let task_id = self.add_task(task, name)?;
            outcome.tasks += 1;
            if let Some(parent) = parent.filter(|_| self.options.structure_links) {
                self.link_resource(&parent, HAS_SUBTASK, &task_id)?;
            }

            for dataset in &task.datasets {
                self.add_dataset(&task_id, dataset, &mut outcome)?;
            }

            // Reversed so subtasks pop in document order.
            for subtask in task.subtasks.iter().rev() {
                stack.push((subtask, depth + 1, Some(task_id.clone())));
            }
        }

        Ok(outcome)
    }

    fn add_task(&mut self, task: &TaskRecord, name: &str) -> ImportResult<ThingId> {
        let resolved = self.resource_in(Table::Tasks, name)?;
        if resolved.created {
            let links = self.describe_task(&resolved.id, task);
            self.settle_created(Table::Tasks, name, links)?;
        }
        Ok(resolved.id)
    }

    fn describe_task(&mut self, task_id: &ThingId, task: &TaskRecord) -> ImportResult<()> {
        if let Some(description) = non_blank(&task.description) {
            self.link_literal(task_id, HAS_DESCRIPTION, description)?;
        }
        for category in task.categories.iter().filter(|c| !c.trim().is_empty()) {
            let category = self.resource_in(Table::Categories, category)?;
            self.link_resource(task_id, HAS_CATEGORY, &category.id)?;
        }
        Ok(())
    }

    fn add_dataset(
        &mut self,
        task_id: &ThingId,
        dataset: &DatasetRecord,
        outcome: &mut TaskTreeOutcome,
    ) -> ImportResult<()> {
        let Some(name) = non_blank(&dataset.dataset) else {
            outcome.skip(RecordError::MissingField {
                record: "dataset",
                field: "dataset",
            });
            return Ok(());
        };

        let resolved = self.resource_in(Table::Datasets, name)?;
        if let Some(description) = non_blank(&dataset.description).filter(|_| resolved.created) {
            let linked = self.link_literal(&resolved.id, HAS_DESCRIPTION, description);
            self.settle_created(Table::Datasets, name, linked)?;
        }
        if self.options.structure_links {
            self.link_resource(task_id, HAS_DATASET, &resolved.id)?;
        }
        outcome.datasets += 1;

        let rows = dataset.sota.iter().flat_map(|sota| &sota.sota_rows);
        for row in rows {
            let created = self.add_sota_row(&resolved.id, row, outcome)?;
            outcome.results += created;
        }
        Ok(())
    }

    /// Write one results-table row. Returns the number of result nodes created.
    fn add_sota_row(
        &mut self,
        dataset_id: &ThingId,
        row: &SotaRow,
        outcome: &mut TaskTreeOutcome,
    ) -> ImportResult<usize> {
        let Some(title) = non_blank(&row.paper_title) else {
            outcome.skip(RecordError::MissingField {
                record: "sota row",
                field: "paper_title",
            });
            return Ok(0);
        };

        let evaluation = self.resource_in_as(Table::Evaluations, title, evaluation_label)?;
        if evaluation.created {
            let linked = self
                .paper_or_bare(title)
                .and_then(|paper| self.link_resource(&paper, HAS_EVALUATION, &evaluation.id));
            self.settle_created(Table::Evaluations, title, linked)?;
        }

        let model = match non_blank(&row.model_name) {
            Some(model) => Some(self.resource_in(Table::Models, model)?.id),
            None => None,
        };

        let mut created = 0;
        for (metric, value) in &row.metrics {
            let Some(value) = metric_value_label(value) else {
                continue;
            };

            let label = self.results.next_label();
            let result = self.store.create_resource(&label)?;
            self.link_resource(&evaluation.id, HAS_RESULT, &result)?;

            let metric = self.resource_in(Table::Metrics, metric)?;
            self.link_resource(&result, HAS_METRIC, &metric.id)?;
            self.link_literal(&result, HAS_VALUE, &value)?;
            if let Some(model) = &model {
                self.link_resource(&result, ON_MODEL, model)?;
            }
            self.link_resource(&result, USING_DATASET, dataset_id)?;
            created += 1;
        }
        Ok(created)
    }

    /// The paper resource for `title`, creating a bare one if none exists yet.
    fn paper_or_bare(&mut self, title: &str) -> ImportResult<ThingId> {
        if let Some(id) = self.tables.resources.get(title) {
            return Ok(id.clone());
        }
        tracing::debug!(title, "evaluation for unseen paper; creating bare paper resource");
        let id = self.store.create_resource(title)?;
        self.tables.resources.insert(title, id.clone());
        Ok(id)
    }
}

//! Research-field taxonomy.

use super::builder::{GraphBuilder, Table};
use super::model::{non_blank, ResearchField};
use super::predicates::HAS_SUBFIELD;
use crate::error::{ImportResult, RecordError};
use crate::store::GraphStore;
use crate::thing::ThingId;

/// Counts for one taxonomy tree.
#[derive(Debug, Default)]
pub struct FieldTreeOutcome {
    pub fields: usize,
    pub skipped: Vec<RecordError>,
}

impl<S: GraphStore> GraphBuilder<S> {
    /// The taxonomy root resource, if one is configured.
    fn taxonomy_root(&mut self) -> ImportResult<Option<ThingId>> {
        let Some(root) = self.options.taxonomy_root.clone() else {
            return Ok(None);
        };
        Ok(Some(self.resource_in(Table::Fields, &root)?.id))
    }

    /// Add a top-level field and its subfields.
    pub fn add_field_tree(&mut self, root: &ResearchField) -> ImportResult<FieldTreeOutcome> {
        let mut outcome = FieldTreeOutcome::default();
        let limit = self.options.max_field_depth;
        let parent = self.taxonomy_root()?;
        let mut stack: Vec<(&ResearchField, usize, Option<ThingId>)> = vec![(root, 1, parent)];

        while let Some((field, depth, parent)) = stack.pop() {
            let Some(name) = non_blank(&field.name) else {
                tracing::warn!(depth, "research field without a name; skipping subtree");
                outcome.skipped.push(RecordError::MissingField {
                    record: "research field",
                    field: "name",
                });
                continue;
            };
            if depth > limit {
                tracing::warn!(name, limit, "research field nested too deep; skipping subtree");
                outcome.skipped.push(RecordError::DepthExceeded {
                    kind: "research field",
                    label: name.to_string(),
                    limit,
                });
                continue;
            }

            let id = self.resource_in(Table::Fields, name)?.id;
            outcome.fields += 1;
            if let Some(parent) = parent {
                self.link_resource(&parent, HAS_SUBFIELD, &id)?;
            }

            for child in field.subfields.iter().rev() {
                stack.push((child, depth + 1, Some(id.clone())));
            }
        }

        Ok(outcome)
    }
}

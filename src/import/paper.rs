//! Paper subgraph: one resource per record, one literal per present field.

use super::builder::GraphBuilder;
use super::model::PaperRecord;
use super::predicates::paper_fields;
use crate::error::ImportResult;
use crate::store::GraphStore;
use crate::thing::ThingId;

impl<S: GraphStore> GraphBuilder<S> {
    /// Add a paper and its metadata literals.
    ///
    /// Returns `None` without touching the store when the record has no title.
    /// A repeated title creates a fresh resource and the title then resolves
    /// to the newest one.
    pub fn add_paper(&mut self, paper: &PaperRecord) -> ImportResult<Option<ThingId>> {
        let Some(title) = paper.title.as_deref() else {
            return Ok(None);
        };

        let id = self.store.create_resource(title)?;
        if let Some(previous) = self.tables.resources.insert(title, id.clone()) {
            tracing::debug!(title, %previous, current = %id, "paper title seen again; newest resource wins");
        }

        for (predicate, value) in paper_fields(paper) {
            if let Some(value) = value {
                self.link_literal(&id, predicate, value)?;
            }
        }
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::import::builder::{BuilderOptions, GraphBuilder};
    use crate::import::model::PaperRecord;
    use crate::store::memory::NodeKind;
    use crate::store::{GraphStore, MemoryStore};

    fn builder() -> GraphBuilder<MemoryStore> {
        GraphBuilder::new(MemoryStore::new(), BuilderOptions::default())
    }

    fn paper(title: &str) -> PaperRecord {
        PaperRecord {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    #[test]
    fn only_present_fields_become_literals() {
        let mut b = builder();
        let id = b
            .add_paper(&PaperRecord {
                title: Some("A".into()),
                arxiv_id: Some("123".into()),
                abstract_text: None,
                url_pdf: Some("http://x".into()),
                proceeding: None,
            })
            .unwrap()
            .unwrap();

        let store = b.store();
        assert_eq!(store.count(NodeKind::Resource), 1);
        assert_eq!(store.count(NodeKind::Literal), 2);
        assert_eq!(store.statements().len(), 2);
        assert_eq!(store.objects_of(&id, "has arxiv id").len(), 1);
        assert_eq!(store.objects_of(&id, "has url").len(), 1);
        assert!(store.objects_of(&id, "has abstract").is_empty());
        assert!(store.objects_of(&id, "has title").is_empty());
        assert_eq!(b.paper_id("A"), Some(&id));
    }

    #[test]
    fn proceeding_is_linked_as_title() {
        let mut b = builder();
        let id = b
            .add_paper(&PaperRecord {
                proceeding: Some("NeurIPS 2019".into()),
                ..paper("A")
            })
            .unwrap()
            .unwrap();

        let store = b.store();
        let object = store.objects_of(&id, "has title")[0];
        assert_eq!(store.label_of(&object.id), Some("NeurIPS 2019"));
    }

    #[test]
    fn untitled_record_is_skipped() {
        let mut b = builder();
        assert_eq!(b.add_paper(&PaperRecord::default()).unwrap(), None);
        assert_eq!(b.store().call_count(), 0);
    }

    #[test]
    fn repeated_title_keeps_the_newest_resource() {
        let mut b = builder();
        let first = b.add_paper(&paper("A")).unwrap().unwrap();
        let second = b.add_paper(&paper("A")).unwrap().unwrap();
        assert_ne!(first, second);
        assert_eq!(b.paper_id("A"), Some(&second));
        assert_eq!(b.store().resources_labeled("A").len(), 2);
    }

    #[test]
    fn shared_predicates_are_created_once() {
        let mut b = builder();
        for title in ["A", "B", "C"] {
            b.add_paper(&PaperRecord {
                url_pdf: Some(format!("http://{title}")),
                ..paper(title)
            })
            .unwrap();
        }
        assert_eq!(b.store().count(NodeKind::Predicate), 1);
        assert_eq!(b.store().statements_with("has url").len(), 3);
    }
}

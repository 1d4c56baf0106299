//! Code-link subgraph and the deferred not-found pass.

use super::builder::{GraphBuilder, LinkPolicy, Table};
use super::model::CodeLinkRecord;
use super::predicates::{implementation_label, HAS_IMPLEMENTATION, HAS_REPO_URL};
use crate::error::{ImportResult, RecordError};
use crate::store::GraphStore;
use crate::thing::ThingId;

/// What happened to one code-link record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeLinkOutcome {
    /// The paper was known; the implementation is resolved.
    Linked {
        implementation: ThingId,
        /// `true` when this record created the implementation resource.
        created: bool,
    },
    /// The paper was unknown; its title went on the not-found list.
    Deferred,
}

impl<S: GraphStore> GraphBuilder<S> {
    /// Attach a repository link to a known paper, or defer it.
    pub fn add_code_link(&mut self, link: &CodeLinkRecord) -> ImportResult<CodeLinkOutcome> {
        let title = link.paper_title.as_deref().ok_or(RecordError::MissingField {
            record: "code link",
            field: "paper_title",
        })?;

        let Some(paper) = self.tables.resources.get(title).cloned() else {
            self.defer(title);
            return Ok(CodeLinkOutcome::Deferred);
        };

        let implementation = self.resource_in_as(Table::Implementations, title, implementation_label)?;
        let link_paper = match self.options.link_policy {
            LinkPolicy::FirstCreation => implementation.created,
            LinkPolicy::EveryCall => true,
        };
        if link_paper {
            let linked = self.link_resource(&paper, HAS_IMPLEMENTATION, &implementation.id);
            if implementation.created {
                self.settle_created(Table::Implementations, title, linked)?;
            } else {
                linked?;
            }
        }

        if let Some(url) = link.repo_url.as_deref() {
            self.link_literal(&implementation.id, HAS_REPO_URL, url)?;
        }

        Ok(CodeLinkOutcome::Linked {
            implementation: implementation.id,
            created: implementation.created,
        })
    }

    fn defer(&mut self, title: &str) {
        if self.not_found.iter().any(|t| t == title) {
            return;
        }
        tracing::debug!(title, "paper not seen yet; deferring code link");
        self.not_found.push(title.to_string());
    }

    /// Drain the not-found list, oldest first.
    pub fn take_not_found(&mut self) -> Vec<String> {
        std::mem::take(&mut self.not_found)
    }

    /// Fix up one deferred title.
    ///
    /// Creates the paper resource if it is still unknown, then replays the
    /// first record in `links` that names the title.
    pub fn resolve_deferred(&mut self, title: &str, links: &[CodeLinkRecord]) -> ImportResult<CodeLinkOutcome> {
        if !self.tables.resources.contains(title) {
            let id = self.store.create_resource(title)?;
            self.tables.resources.insert(title, id);
        }

        let record = links
            .iter()
            .find(|link| link.paper_title.as_deref() == Some(title))
            .ok_or_else(|| RecordError::NoMatchingCodeLink {
                title: title.to_string(),
            })?;
        self.add_code_link(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;
    use crate::import::builder::BuilderOptions;
    use crate::import::model::PaperRecord;
    use crate::store::memory::NodeKind;
    use crate::store::MemoryStore;
    use crate::thing::ObjectRef;

    fn builder_with(policy: LinkPolicy) -> GraphBuilder<MemoryStore> {
        GraphBuilder::new(
            MemoryStore::new(),
            BuilderOptions {
                link_policy: policy,
                ..Default::default()
            },
        )
    }

    fn add_paper(b: &mut GraphBuilder<MemoryStore>, title: &str) -> ThingId {
        b.add_paper(&PaperRecord {
            title: Some(title.into()),
            ..Default::default()
        })
        .unwrap()
        .unwrap()
    }

    fn linked(outcome: CodeLinkOutcome) -> (ThingId, bool) {
        match outcome {
            CodeLinkOutcome::Linked { implementation, created } => (implementation, created),
            CodeLinkOutcome::Deferred => panic!("expected the link to resolve"),
        }
    }

    #[test]
    fn repeated_links_share_one_implementation() {
        let mut b = builder_with(LinkPolicy::FirstCreation);
        let paper = add_paper(&mut b, "A");

        let (i1, c1) = linked(b.add_code_link(&CodeLinkRecord::new("A", "u1")).unwrap());
        let (i2, c2) = linked(b.add_code_link(&CodeLinkRecord::new("A", "u2")).unwrap());
        assert_eq!(i1, i2);
        assert!(c1);
        assert!(!c2);

        let store = b.store();
        assert_eq!(store.resources_labeled("(Implementation) A").len(), 1);
        assert_eq!(store.objects_of(&paper, "has implementation").len(), 1);
        assert_eq!(store.objects_of(&i1, "has repo url").len(), 2);
    }

    #[test]
    fn failed_first_link_is_retried_by_the_next_record() {
        let mut b = builder_with(LinkPolicy::FirstCreation);
        let paper = add_paper(&mut b, "A");

        b.store.fail_next_statements(1);
        assert!(b.add_code_link(&CodeLinkRecord::new("A", "u1")).is_err());
        assert!(!b.tables().implementations.contains("A"));

        let (implementation, created) = linked(b.add_code_link(&CodeLinkRecord::new("A", "u2")).unwrap());
        assert!(created);
        let store = b.store();
        assert_eq!(
            store.objects_of(&paper, "has implementation"),
            vec![&ObjectRef::resource(implementation.clone())]
        );
        assert_eq!(store.objects_of(&implementation, "has repo url").len(), 1);
    }

    #[test]
    fn every_call_policy_links_each_time() {
        let mut b = builder_with(LinkPolicy::EveryCall);
        let paper = add_paper(&mut b, "A");
        b.add_code_link(&CodeLinkRecord::new("A", "u1")).unwrap();
        b.add_code_link(&CodeLinkRecord::new("A", "u2")).unwrap();

        assert_eq!(b.store().objects_of(&paper, "has implementation").len(), 2);
        assert_eq!(b.store().resources_labeled("(Implementation) A").len(), 1);
    }

    #[test]
    fn unknown_title_is_deferred_once() {
        let mut b = builder_with(LinkPolicy::FirstCreation);
        assert_eq!(
            b.add_code_link(&CodeLinkRecord::new("B", "u1")).unwrap(),
            CodeLinkOutcome::Deferred
        );
        b.add_code_link(&CodeLinkRecord::new("B", "u2")).unwrap();
        assert_eq!(b.not_found(), ["B".to_string()]);
        assert_eq!(b.store().call_count(), 0);
    }

    #[test]
    fn null_repo_url_still_resolves_the_implementation() {
        let mut b = builder_with(LinkPolicy::FirstCreation);
        add_paper(&mut b, "A");
        let outcome = b
            .add_code_link(&CodeLinkRecord {
                paper_title: Some("A".into()),
                repo_url: None,
            })
            .unwrap();
        assert!(matches!(outcome, CodeLinkOutcome::Linked { created: true, .. }));
        assert!(b.store().statements_with("has repo url").is_empty());
    }

    #[test]
    fn missing_title_is_a_record_error() {
        let mut b = builder_with(LinkPolicy::FirstCreation);
        let err = b.add_code_link(&CodeLinkRecord::default()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Record(RecordError::MissingField { field: "paper_title", .. })
        ));
    }

    #[test]
    fn deferred_title_gets_paper_and_code_subgraph() {
        let mut b = builder_with(LinkPolicy::FirstCreation);
        let links = vec![CodeLinkRecord::new("B", "u1"), CodeLinkRecord::new("B", "u2")];
        for link in &links {
            b.add_code_link(link).unwrap();
        }

        let pending = b.take_not_found();
        assert_eq!(pending, ["B".to_string()]);
        assert!(b.not_found().is_empty());

        let outcome = b.resolve_deferred("B", &links).unwrap();
        assert!(matches!(outcome, CodeLinkOutcome::Linked { created: true, .. }));

        let store = b.store();
        let paper = b.paper_id("B").unwrap();
        assert_eq!(store.resources_labeled("B").len(), 1);
        assert_eq!(store.objects_of(paper, "has implementation").len(), 1);
        // Only the first matching record is replayed.
        assert_eq!(store.statements_with("has repo url").len(), 1);
    }

    #[test]
    fn deferred_title_without_record_is_reported() {
        let mut b = builder_with(LinkPolicy::FirstCreation);
        let err = b.resolve_deferred("Ghost", &[]).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Record(RecordError::NoMatchingCodeLink { ref title }) if title == "Ghost"
        ));
        // The paper resource is created before the lookup fails.
        assert_eq!(b.store().count(NodeKind::Resource), 1);
    }

    #[test]
    fn deferred_title_seen_later_reuses_the_paper() {
        let mut b = builder_with(LinkPolicy::FirstCreation);
        let links = vec![CodeLinkRecord::new("C", "u1")];
        b.add_code_link(&links[0]).unwrap();
        let paper = add_paper(&mut b, "C");

        for title in b.take_not_found() {
            b.resolve_deferred(&title, &links).unwrap();
        }
        assert_eq!(b.store().resources_labeled("C").len(), 1);
        assert_eq!(b.store().objects_of(&paper, "has implementation").len(), 1);
    }
}

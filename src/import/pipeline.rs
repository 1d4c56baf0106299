//! Import run orchestration.
//!
//! Runs the passes in a fixed order (papers, code links, deferred fixup,
//! evaluations, fields), logs progress, and collects per-record failures
//! into an [`ImportReport`].

use std::fmt;

use miette::Diagnostic;

use super::builder::{BuilderOptions, GraphBuilder};
use super::code::CodeLinkOutcome;
use super::loader::ImportInputs;
use super::model::{CodeLinkRecord, PaperRecord, ResearchField, TaskRecord};
use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult, RecordError};
use crate::store::GraphStore;

/// One pass over an input collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Papers,
    CodeLinks,
    Deferred,
    Evaluations,
    Fields,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::Papers => "papers",
            Pass::CodeLinks => "code links",
            Pass::Deferred => "deferred links",
            Pass::Evaluations => "evaluations",
            Pass::Fields => "fields",
        };
        f.pad(name)
    }
}

/// Per-pass record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub records: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// A record (or part of one) that could not be imported.
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub pass: Pass,
    /// Position in the input collection (or in the not-found list).
    pub index: usize,
    pub label: Option<String>,
    /// Diagnostic code, e.g. `pgi::store::status`.
    pub code: Option<String>,
    pub message: String,
}

/// Summary of a run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub papers: PassStats,
    pub code_links: PassStats,
    pub deferred: PassStats,
    pub evaluations: PassStats,
    pub fields: PassStats,
    /// Paper records without a title.
    pub untitled_papers: usize,
    /// Code links that went on the not-found list.
    pub deferred_links: usize,
    pub tasks_created: usize,
    pub results_created: usize,
    pub fields_created: usize,
    /// Create calls issued against the store.
    pub store_calls: usize,
    pub failures: Vec<RecordFailure>,
}

impl ImportReport {
    pub fn stats(&self, pass: Pass) -> &PassStats {
        match pass {
            Pass::Papers => &self.papers,
            Pass::CodeLinks => &self.code_links,
            Pass::Deferred => &self.deferred,
            Pass::Evaluations => &self.evaluations,
            Pass::Fields => &self.fields,
        }
    }

    fn stats_mut(&mut self, pass: Pass) -> &mut PassStats {
        match pass {
            Pass::Papers => &mut self.papers,
            Pass::CodeLinks => &mut self.code_links,
            Pass::Deferred => &mut self.deferred,
            Pass::Evaluations => &mut self.evaluations,
            Pass::Fields => &mut self.fields,
        }
    }

    /// Whether every record went through.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pass in [
            Pass::Papers,
            Pass::CodeLinks,
            Pass::Deferred,
            Pass::Evaluations,
            Pass::Fields,
        ] {
            let stats = self.stats(pass);
            if stats.records == 0 {
                continue;
            }
            writeln!(
                f,
                "  {pass:<15} {:>7} records  {:>7} ok  {:>5} failed",
                stats.records, stats.succeeded, stats.failed
            )?;
        }
        if self.untitled_papers > 0 {
            writeln!(f, "  untitled papers skipped: {}", self.untitled_papers)?;
        }
        if self.deferred_links > 0 {
            writeln!(f, "  code links deferred:     {}", self.deferred_links)?;
        }
        if self.tasks_created + self.results_created > 0 {
            writeln!(
                f,
                "  tasks: {}  results: {}",
                self.tasks_created, self.results_created
            )?;
        }
        if self.fields_created > 0 {
            writeln!(f, "  research fields: {}", self.fields_created)?;
        }
        write!(f, "  store calls: {}", self.store_calls)
    }
}

/// Drives a [`GraphBuilder`] over loaded inputs.
pub struct Importer<S> {
    builder: GraphBuilder<S>,
    progress_interval: usize,
    fail_fast: bool,
    report: ImportReport,
}

impl<S: GraphStore> Importer<S> {
    pub fn new(store: S, config: &ImportConfig) -> Self {
        Self {
            builder: GraphBuilder::new(store, BuilderOptions::from(config)),
            progress_interval: config.progress_interval,
            fail_fast: config.fail_fast,
            report: ImportReport::default(),
        }
    }

    pub fn builder(&self) -> &GraphBuilder<S> {
        &self.builder
    }

    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    /// Finish the run, handing back the report and the store.
    pub fn finish(mut self) -> (ImportReport, S) {
        self.report.store_calls = self.builder.store().call_count();
        (self.report, self.builder.into_store())
    }

    /// Run every pass whose input is present, in order.
    ///
    /// The deferred fixup runs whenever code links were given.
    pub fn run(&mut self, inputs: &ImportInputs) -> ImportResult<()> {
        if let Some(papers) = &inputs.papers {
            self.import_papers(papers)?;
        }
        if let Some(links) = &inputs.links {
            self.import_code_links(links)?;
            self.resolve_deferred(links)?;
        }
        if let Some(tasks) = &inputs.tasks {
            self.import_tasks(tasks)?;
        }
        if let Some(fields) = &inputs.fields {
            self.import_fields(fields)?;
        }
        self.report.store_calls = self.builder.store().call_count();
        Ok(())
    }

    pub fn import_papers(&mut self, papers: &[PaperRecord]) -> ImportResult<()> {
        let total = papers.len();
        tracing::info!(total, "importing papers");
        for (index, paper) in papers.iter().enumerate() {
            let result = self.builder.add_paper(paper).map(|id| {
                if id.is_none() {
                    self.report.untitled_papers += 1;
                }
            });
            self.settle(Pass::Papers, index, paper.title.as_deref(), result)?;
            self.progress(Pass::Papers, index + 1, total);
        }
        Ok(())
    }

    pub fn import_code_links(&mut self, links: &[CodeLinkRecord]) -> ImportResult<()> {
        let total = links.len();
        tracing::info!(total, "importing code links");
        for (index, link) in links.iter().enumerate() {
            let result = self.builder.add_code_link(link).map(|outcome| {
                if outcome == CodeLinkOutcome::Deferred {
                    self.report.deferred_links += 1;
                }
            });
            self.settle(Pass::CodeLinks, index, link.paper_title.as_deref(), result)?;
            self.progress(Pass::CodeLinks, index + 1, total);
        }
        Ok(())
    }

    /// Drain the not-found list against the same link collection.
    pub fn resolve_deferred(&mut self, links: &[CodeLinkRecord]) -> ImportResult<()> {
        let pending = self.builder.take_not_found();
        if pending.is_empty() {
            return Ok(());
        }
        let total = pending.len();
        tracing::info!(total, "resolving deferred code links");
        for (index, title) in pending.iter().enumerate() {
            let result = self.builder.resolve_deferred(title, links).map(drop);
            self.settle(Pass::Deferred, index, Some(title), result)?;
            self.progress(Pass::Deferred, index + 1, total);
        }
        Ok(())
    }

    pub fn import_tasks(&mut self, tasks: &[TaskRecord]) -> ImportResult<()> {
        let total = tasks.len();
        tracing::info!(total, "importing evaluation tables");
        for (index, task) in tasks.iter().enumerate() {
            let label = task.task.as_deref();
            let result = match self.builder.add_task_tree(task) {
                Ok(outcome) => {
                    self.report.tasks_created += outcome.tasks;
                    self.report.results_created += outcome.results;
                    self.skipped(Pass::Evaluations, index, label, outcome.skipped)
                }
                Err(e) => Err(e),
            };
            self.settle(Pass::Evaluations, index, label, result)?;
            self.progress(Pass::Evaluations, index + 1, total);
        }
        Ok(())
    }

    pub fn import_fields(&mut self, fields: &[ResearchField]) -> ImportResult<()> {
        let total = fields.len();
        tracing::info!(total, "importing research fields");
        for (index, field) in fields.iter().enumerate() {
            let label = field.name.as_deref();
            let result = match self.builder.add_field_tree(field) {
                Ok(outcome) => {
                    self.report.fields_created += outcome.fields;
                    self.skipped(Pass::Fields, index, label, outcome.skipped)
                }
                Err(e) => Err(e),
            };
            self.settle(Pass::Fields, index, label, result)?;
            self.progress(Pass::Fields, index + 1, total);
        }
        Ok(())
    }

    /// Record the skipped parts of a tree. Under fail-fast the first one aborts.
    fn skipped(
        &mut self,
        pass: Pass,
        index: usize,
        label: Option<&str>,
        skipped: Vec<RecordError>,
    ) -> ImportResult<()> {
        let mut skipped = skipped.into_iter();
        if self.fail_fast {
            return skipped.next().map_or(Ok(()), |e| Err(e.into()));
        }
        for error in skipped {
            self.report
                .failures
                .push(failure(pass, index, label, &ImportError::from(error)));
        }
        Ok(())
    }

    /// Count a record and, unless fail-fast, absorb its error.
    fn settle(
        &mut self,
        pass: Pass,
        index: usize,
        label: Option<&str>,
        result: ImportResult<()>,
    ) -> ImportResult<()> {
        let stats = self.report.stats_mut(pass);
        stats.records += 1;
        match result {
            Ok(()) => {
                stats.succeeded += 1;
                Ok(())
            }
            Err(e) => {
                stats.failed += 1;
                if self.fail_fast {
                    tracing::error!(%pass, index, label, error = %e, "record failed; aborting");
                    return Err(e);
                }
                tracing::warn!(%pass, index, label, error = %e, "record failed");
                self.report.failures.push(failure(pass, index, label, &e));
                Ok(())
            }
        }
    }

    fn progress(&self, pass: Pass, done: usize, total: usize) {
        if self.progress_interval > 0 && done % self.progress_interval == 0 {
            tracing::info!(%pass, done, total, "progress");
        }
    }
}

fn failure(pass: Pass, index: usize, label: Option<&str>, error: &ImportError) -> RecordFailure {
    RecordFailure {
        pass,
        index,
        label: label.map(str::to_string),
        code: error.code().map(|c| c.to_string()),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn config() -> ImportConfig {
        ImportConfig {
            progress_interval: 1,
            ..Default::default()
        }
    }

    fn paper(title: &str) -> PaperRecord {
        PaperRecord {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    #[test]
    fn passes_run_in_order_and_fill_the_report() {
        let inputs = ImportInputs {
            papers: Some(vec![paper("A"), PaperRecord::default()]),
            links: Some(vec![CodeLinkRecord::new("A", "u1"), CodeLinkRecord::new("B", "u2")]),
            tasks: None,
            fields: Some(vec![ResearchField {
                name: Some("Science".into()),
                subfields: Vec::new(),
            }]),
        };

        let mut importer = Importer::new(MemoryStore::new(), &config());
        importer.run(&inputs).unwrap();
        let (report, store) = importer.finish();

        assert_eq!(report.papers.records, 2);
        assert_eq!(report.untitled_papers, 1);
        assert_eq!(report.code_links.succeeded, 2);
        assert_eq!(report.deferred_links, 1);
        assert_eq!(report.deferred.succeeded, 1);
        assert_eq!(report.fields_created, 1);
        assert!(report.is_clean());
        assert_eq!(report.store_calls, store.call_count());
        assert_eq!(store.resources_labeled("(Implementation) B").len(), 1);
    }

    #[test]
    fn failures_are_recorded_and_the_run_continues() {
        let mut store = MemoryStore::new();
        store.reject_label("Broken");

        let mut importer = Importer::new(store, &config());
        importer
            .import_papers(&[paper("Broken"), paper("Fine")])
            .unwrap();

        let report = importer.report();
        assert_eq!(report.papers.failed, 1);
        assert_eq!(report.papers.succeeded, 1);
        let failure = &report.failures[0];
        assert_eq!(failure.pass, Pass::Papers);
        assert_eq!(failure.index, 0);
        assert_eq!(failure.label.as_deref(), Some("Broken"));
        assert_eq!(failure.code.as_deref(), Some("pgi::store::refused"));
        assert!(importer.builder().paper_id("Fine").is_some());
    }

    #[test]
    fn fail_fast_stops_at_the_first_error() {
        let mut store = MemoryStore::new();
        store.reject_label("Broken");
        let cfg = ImportConfig {
            fail_fast: true,
            ..config()
        };

        let mut importer = Importer::new(store, &cfg);
        let err = importer
            .import_papers(&[paper("Broken"), paper("Fine")])
            .unwrap_err();
        assert!(matches!(err, ImportError::Store(_)));
        assert!(importer.builder().paper_id("Fine").is_none());
    }

    #[test]
    fn unmatched_deferred_title_is_a_failure() {
        let mut importer = Importer::new(MemoryStore::new(), &config());
        importer
            .import_code_links(&[CodeLinkRecord::new("Ghost", "u")])
            .unwrap();
        // Fix up against a collection that no longer names the title.
        importer.resolve_deferred(&[]).unwrap();

        let report = importer.report();
        assert_eq!(report.deferred.failed, 1);
        assert_eq!(
            report.failures[0].code.as_deref(),
            Some("pgi::record::no_code_link")
        );
        assert!(importer.builder().not_found().is_empty());
    }

    #[test]
    fn skipped_tree_parts_become_failures() {
        let cfg = ImportConfig {
            max_task_depth: 1,
            ..config()
        };
        let tasks = vec![TaskRecord {
            task: Some("Root".into()),
            subtasks: vec![TaskRecord {
                task: Some("Deep".into()),
                ..Default::default()
            }],
            ..Default::default()
        }];

        let mut importer = Importer::new(MemoryStore::new(), &cfg);
        importer.import_tasks(&tasks).unwrap();

        let report = importer.report();
        assert_eq!(report.evaluations.succeeded, 1);
        assert_eq!(report.tasks_created, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].label.as_deref(), Some("Root"));
        assert_eq!(
            report.failures[0].code.as_deref(),
            Some("pgi::record::depth_exceeded")
        );
    }

    #[test]
    fn report_renders_only_used_passes() {
        let report = ImportReport {
            papers: PassStats {
                records: 3,
                succeeded: 2,
                failed: 1,
            },
            store_calls: 9,
            ..Default::default()
        };
        let text = report.to_string();
        assert!(text.contains("papers"));
        assert!(!text.contains("evaluations"));
        assert!(text.ends_with("store calls: 9"));
    }
}

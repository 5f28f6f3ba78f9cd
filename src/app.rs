use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;

use crate::audit::{AuditReport, audit};
use crate::bootstrap::{CategoryMarker, ensure_category_marker, register_new_versions};
use crate::config::ResolvedConfig;
use crate::domain::PanelVersion;
use crate::error::KiraError;
use crate::fetcher::fetch_all;
use crate::panelapp::CatalogClient;
use crate::reconcile::{Action, LoadContext, UnresolvedGene, load_existing_panels, reconcile};
use crate::snapshot::{SnapshotFiles, SymbolIndex, read_identifier_file, read_symbol_file};
use crate::store::PanelStore;

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub identifier_file: String,
    pub symbol_file: String,
    pub panels: usize,
    pub identifier_lines: usize,
    pub symbol_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadResult {
    pub category: CategoryMarker,
    pub versions_registered: Vec<PanelVersion>,
    pub records: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub unresolved: Vec<UnresolvedGene>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitResult {
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<C: CatalogClient> {
    config: ResolvedConfig,
    catalog: C,
}

impl<C: CatalogClient> App<C> {
    pub fn new(config: ResolvedConfig, catalog: C) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn snapshot_files(&self) -> SnapshotFiles {
        SnapshotFiles::today(&self.config.output_dir)
    }

    pub fn fetch(
        &self,
        files: &SnapshotFiles,
        sink: &dyn ProgressSink,
    ) -> Result<FetchResult, KiraError> {
        let outcome = fetch_all(&self.catalog, files, sink)?;
        Ok(FetchResult {
            identifier_file: files.identifiers.to_string(),
            symbol_file: files.symbols.to_string(),
            panels: outcome.panels.len(),
            identifier_lines: outcome.summary.identifier_lines,
            symbol_lines: outcome.summary.symbol_lines,
        })
    }

    pub fn load<S: PanelStore + ?Sized>(
        &self,
        store: &S,
        files: &SnapshotFiles,
        sink: &dyn ProgressSink,
    ) -> Result<LoadResult, KiraError> {
        let started = Instant::now();
        sink.event(ProgressEvent {
            message: "phase=Read; parsing snapshot files".to_string(),
            elapsed: None,
        });
        let records = read_identifier_file(&files.identifiers)?;
        let symbols = SymbolIndex::from_records(&read_symbol_file(&files.symbols)?);

        sink.event(ProgressEvent {
            message: "phase=Bootstrap; checking version vocabulary".to_string(),
            elapsed: Some(started.elapsed()),
        });
        let category = ensure_category_marker(store, &self.config.version_category)?;
        let versions_registered = register_new_versions(store, &category, &records)?;

        sink.event(ProgressEvent {
            message: "phase=Index; loading existing panels".to_string(),
            elapsed: Some(started.elapsed()),
        });
        let existing =
            load_existing_panels(store, self.config.panel_item_category, category.id)?;
        let mut ctx = LoadContext {
            panel_category: self.config.panel_item_category,
            version_category: category.id,
            checker_id: self.config.checker_id,
            existing,
        };

        let mut actions = Vec::with_capacity(records.len());
        for record in &records {
            sink.event(ProgressEvent {
                message: format!("phase=Reconcile; {}", record.header.label()),
                elapsed: Some(started.elapsed()),
            });
            actions.push(reconcile(store, &mut ctx, record, &symbols)?);
        }

        let mut inserted = 0;
        let mut unresolved = Vec::new();
        for action in &actions {
            if let Action::InsertNew(insert) = action {
                inserted += 1;
                unresolved.extend(insert.symbols.unresolved.iter().cloned());
            }
        }

        Ok(LoadResult {
            category,
            versions_registered,
            records: records.len(),
            inserted,
            skipped: records.len() - inserted,
            unresolved,
            actions,
        })
    }

    pub fn audit<S: PanelStore + ?Sized>(
        &self,
        store: &S,
        symbols_path: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<AuditReport, KiraError> {
        sink.event(ProgressEvent {
            message: format!("phase=Read; parsing {symbols_path}"),
            elapsed: None,
        });
        let records = read_symbol_file(symbols_path)?;
        sink.event(ProgressEvent {
            message: "phase=Audit; comparing stored symbols".to_string(),
            elapsed: None,
        });
        audit(store, &records, &self.config.audit_exclusion_prefix)
    }
}

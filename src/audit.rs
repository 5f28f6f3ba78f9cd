use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::error::KiraError;
use crate::snapshot::SymbolRecord;
use crate::store::PanelStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelDiscrepancy {
    pub panel: String,
    pub missing_from_store: Vec<String>,
    pub missing_from_catalog: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub panels_checked: usize,
    pub panels_excluded: usize,
    pub discrepancies: Vec<PanelDiscrepancy>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

pub fn audit<S: PanelStore + ?Sized>(
    store: &S,
    records: &[SymbolRecord],
    exclusion_prefix: &str,
) -> Result<AuditReport, KiraError> {
    let mut report = AuditReport::default();
    for record in records {
        let header = &record.header;
        if !exclusion_prefix.is_empty() && header.tier_name().starts_with(exclusion_prefix) {
            report.panels_excluded += 1;
            continue;
        }
        report.panels_checked += 1;

        let label = header.label();
        let stored = store
            .stored_catalog_symbols(&label)?
            .into_rows()
            .into_iter()
            .collect::<BTreeSet<_>>();
        let catalog = record.symbols.iter().cloned().collect::<BTreeSet<_>>();

        let missing_from_store = catalog.difference(&stored).cloned().collect::<Vec<_>>();
        let missing_from_catalog = stored.difference(&catalog).cloned().collect::<Vec<_>>();
        if missing_from_store.is_empty() && missing_from_catalog.is_empty() {
            debug!(panel = %label, "panel consistent");
            continue;
        }
        report.discrepancies.push(PanelDiscrepancy {
            panel: label,
            missing_from_store,
            missing_from_catalog,
        });
    }
    Ok(report)
}

use std::time::Instant;

use tracing::{debug, info};

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::Tier;
use crate::error::KiraError;
use crate::panelapp::{CatalogClient, CatalogGene, CatalogPanel};
use crate::snapshot::{
    PanelSnapshot, SnapshotFiles, SnapshotGene, SnapshotSummary, TierGenes, write_snapshot,
};

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub panels: Vec<PanelSnapshot>,
    pub summary: SnapshotSummary,
}

pub fn fetch_all<C: CatalogClient + ?Sized>(
    client: &C,
    files: &SnapshotFiles,
    sink: &dyn ProgressSink,
) -> Result<FetchOutcome, KiraError> {
    sink.event(ProgressEvent {
        message: "phase=Resolve; listing catalog panels".to_string(),
        elapsed: None,
    });
    let started = Instant::now();
    let catalog = client.list_panels()?;
    info!(panels = catalog.len(), "catalog listed");

    let mut panels = Vec::with_capacity(catalog.len());
    for panel in catalog {
        sink.event(ProgressEvent {
            message: format!("phase=Fetch; panel {} v{}", panel.name, panel.version),
            elapsed: Some(started.elapsed()),
        });
        let genes = client.panel_genes(&panel.id)?;
        panels.push(snapshot_panel(panel, genes));
    }

    sink.event(ProgressEvent {
        message: "phase=Store; writing snapshot files".to_string(),
        elapsed: Some(started.elapsed()),
    });
    let summary = write_snapshot(files, &panels)?;
    info!(
        identifiers = %files.identifiers,
        symbols = %files.symbols,
        lines = summary.identifier_lines,
        "snapshot written"
    );
    Ok(FetchOutcome { panels, summary })
}

pub fn snapshot_panel(panel: CatalogPanel, genes: Vec<CatalogGene>) -> PanelSnapshot {
    PanelSnapshot {
        tiers: classify_genes(&panel, genes),
        panel,
    }
}

pub fn classify_genes(panel: &CatalogPanel, genes: Vec<CatalogGene>) -> Vec<TierGenes> {
    let mut tiers = Tier::RETAINED
        .iter()
        .map(|tier| TierGenes {
            tier: *tier,
            genes: Vec::new(),
        })
        .collect::<Vec<_>>();

    for gene in genes {
        let Some(tier) = Tier::from_confidence(&gene.confidence) else {
            debug!(
                panel = %panel.name,
                symbol = %gene.symbol,
                confidence = %gene.confidence,
                "unknown confidence level, gene ignored"
            );
            continue;
        };
        if let Some(bucket) = tiers.iter_mut().find(|bucket| bucket.tier == tier) {
            bucket.genes.push(SnapshotGene {
                ensembl_ids: gene.ensembl_ids,
                symbol: gene.symbol,
            });
        }
    }
    tiers
}

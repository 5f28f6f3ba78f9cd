use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{PanelTierKey, PanelVersion};
use crate::error::KiraError;
use crate::snapshot::{IdentifierRecord, SymbolIndex};
use crate::store::{GeneTranslation, NewPanelRecord, PanelStore};

pub type PanelIndex = BTreeMap<PanelTierKey, BTreeSet<PanelVersion>>;

#[derive(Debug, Clone)]
pub struct LoadContext {
    pub panel_category: i64,
    pub version_category: i64,
    pub checker_id: i64,
    pub existing: PanelIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedGene {
    pub panel: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenePass {
    pub attached: Vec<String>,
    pub unresolved_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolPass {
    pub curated: Vec<String>,
    pub unresolved: Vec<UnresolvedGene>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelInsert {
    pub key: PanelTierKey,
    pub label: String,
    pub version: PanelVersion,
    pub record_id: i64,
    pub panel_code: String,
    pub superseded: Option<PanelVersion>,
    pub deactivated: usize,
    pub genes: GenePass,
    pub symbols: SymbolPass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Skip {
        key: PanelTierKey,
        version: PanelVersion,
        max_on_file: Option<PanelVersion>,
    },
    InsertNew(PanelInsert),
}

pub fn load_existing_panels<S: PanelStore + ?Sized>(
    store: &S,
    panel_category: i64,
    version_category: i64,
) -> Result<PanelIndex, KiraError> {
    let mut index = PanelIndex::new();
    // NotFound is the first-ever run: nothing stored yet.
    for (key, version) in store
        .panel_versions(panel_category, version_category)?
        .into_rows()
    {
        index
            .entry(PanelTierKey::from_stored(key))
            .or_default()
            .insert(version.parse()?);
    }
    Ok(index)
}

pub fn reconcile<S: PanelStore + ?Sized>(
    store: &S,
    ctx: &mut LoadContext,
    record: &IdentifierRecord,
    symbols: &SymbolIndex,
) -> Result<Action, KiraError> {
    let header = &record.header;
    let key = header.key();
    let known = ctx.existing.get(&key);
    let panel_item_id = resolve_panel_item(store, ctx, &key, known.is_some())?;

    let max_on_file = known.and_then(|versions| versions.last().cloned());
    let is_newer = max_on_file
        .as_ref()
        .is_none_or(|max| header.version > *max);
    if !is_newer {
        debug!(key = %key, version = %header.version, "stored version is current, skipping");
        return Ok(Action::Skip {
            key,
            version: header.version.clone(),
            max_on_file,
        });
    }

    let deactivated = if max_on_file.is_some() {
        store.deactivate_panel_records(panel_item_id)?
    } else {
        0
    };

    let version_text = header.version.to_string();
    let version_item_id = store
        .item_id(&version_text, ctx.version_category)?
        .first()
        .ok_or_else(|| KiraError::MissingVersionItem(version_text.clone()))?;

    let label = header.label();
    let record_id = store.insert_panel_record(&NewPanelRecord {
        panel_item_id,
        version_item_id,
        label: &label,
        checker_id: ctx.checker_id,
    })?;
    let panel_code = store.assign_panel_code(record_id)?;

    let genes = attach_genes(store, ctx, record_id, &label, &record.identifiers)?;
    let api_symbols: &[String] = match symbols.get(header) {
        Some(api_symbols) => api_symbols,
        None => {
            warn!(panel = %label, "no symbol line for this panel, symbol pass skipped");
            &[]
        }
    };
    let symbol_pass = attach_missing_symbols(store, ctx, record_id, &label, api_symbols)?;

    ctx.existing
        .entry(key.clone())
        .or_default()
        .insert(header.version.clone());
    info!(
        panel = %label,
        code = %panel_code,
        genes = genes.attached.len() + symbol_pass.curated.len(),
        "panel inserted"
    );

    Ok(Action::InsertNew(PanelInsert {
        key,
        label,
        version: header.version.clone(),
        record_id,
        panel_code,
        superseded: max_on_file,
        deactivated,
        genes,
        symbols: symbol_pass,
    }))
}

fn resolve_panel_item<S: PanelStore + ?Sized>(
    store: &S,
    ctx: &LoadContext,
    key: &PanelTierKey,
    indexed: bool,
) -> Result<i64, KiraError> {
    if let Some(id) = store.item_id(key.as_str(), ctx.panel_category)?.first() {
        return Ok(id);
    }
    if indexed {
        return Err(KiraError::MissingPanelItem(key.to_string()));
    }
    debug!(key = %key, "new panel-tier item");
    store.insert_item(key.as_str(), ctx.panel_category)
}

pub fn attach_genes<S: PanelStore + ?Sized>(
    store: &S,
    ctx: &LoadContext,
    record_id: i64,
    label: &str,
    identifiers: &[String],
) -> Result<GenePass, KiraError> {
    let mut pass = GenePass::default();
    let mut attached_hgnc = HashSet::new();
    for ensembl_id in identifiers {
        match store.translate_ensembl_id(ensembl_id)?.first() {
            Some(gene) => {
                if !attached_hgnc.insert(gene.hgnc_id.clone()) {
                    continue;
                }
                store.insert_panel_gene(record_id, &gene, ctx.checker_id)?;
                pass.attached.push(gene.symbol);
            }
            None => {
                debug!(panel = label, ensembl_id = %ensembl_id, "no translation for gene id");
                pass.unresolved_ids.push(ensembl_id.clone());
            }
        }
    }
    Ok(pass)
}

pub fn attach_missing_symbols<S: PanelStore + ?Sized>(
    store: &S,
    ctx: &LoadContext,
    record_id: i64,
    label: &str,
    api_symbols: &[String],
) -> Result<SymbolPass, KiraError> {
    let mut attached = store
        .panel_record_symbols(record_id)?
        .into_rows()
        .into_iter()
        .collect::<HashSet<_>>();
    let missing = api_symbols
        .iter()
        .filter(|symbol| !attached.contains(*symbol))
        .cloned()
        .collect::<Vec<_>>();
    let mut pass = SymbolPass::default();
    if missing.is_empty() {
        return Ok(pass);
    }

    let mut attached_hgnc = store
        .panel_record_hgnc_ids(record_id)?
        .into_rows()
        .into_iter()
        .collect::<HashSet<_>>();
    let curated = store
        .curated_symbols()?
        .into_rows()
        .into_iter()
        .collect::<HashSet<_>>();
    for symbol in missing {
        if attached.contains(&symbol) {
            continue;
        }
        let hgnc_id = if curated.contains(&symbol) {
            store.curated_hgnc_id(&symbol)?.first()
        } else {
            None
        };
        match hgnc_id {
            Some(hgnc_id) if attached_hgnc.contains(&hgnc_id) => {
                debug!(
                    panel = label,
                    symbol = %symbol,
                    hgnc_id = %hgnc_id,
                    "curated symbol maps to a gene already attached"
                );
                attached.insert(symbol);
            }
            Some(hgnc_id) => {
                attached_hgnc.insert(hgnc_id.clone());
                let gene = GeneTranslation {
                    hgnc_id,
                    symbol: symbol.clone(),
                };
                store.insert_panel_gene(record_id, &gene, ctx.checker_id)?;
                attached.insert(symbol.clone());
                pass.curated.push(symbol);
            }
            None => {
                warn!(
                    panel = label,
                    symbol = %symbol,
                    "gene cannot be linked via Ensembl id and has no curated override"
                );
                pass.unresolved.push(UnresolvedGene {
                    panel: label.to_string(),
                    symbol,
                });
            }
        }
    }
    Ok(pass)
}

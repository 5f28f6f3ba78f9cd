//! Shared setup for the loader tests: an in-memory database with a small
//! HGNC translation table and helpers for writing snapshot files.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};

use kira_panelsync::app::{App, ProgressEvent, ProgressSink};
use kira_panelsync::config::{Config, ConfigLoader};
use kira_panelsync::domain::PanelId;
use kira_panelsync::error::KiraError;
use kira_panelsync::panelapp::{CatalogClient, CatalogGene, CatalogPanel};
use kira_panelsync::snapshot::SnapshotFiles;
use kira_panelsync::store::{SqliteStore, TranslationRow};

pub const CHECKER: i64 = 42;

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct UnusedCatalog;

impl CatalogClient for UnusedCatalog {
    fn list_panels(&self) -> Result<Vec<CatalogPanel>, KiraError> {
        Err(KiraError::CatalogHttp("not used".to_string()))
    }

    fn panel_genes(&self, _panel_id: &PanelId) -> Result<Vec<CatalogGene>, KiraError> {
        Err(KiraError::CatalogHttp("not used".to_string()))
    }
}

fn translation(hgnc: &str, ensembl: Option<&str>, symbol: &str, curated: bool) -> TranslationRow {
    TranslationRow {
        hgnc_id: hgnc.to_string(),
        approved_symbol: Some(symbol.to_string()),
        ensembl_id: ensembl.map(str::to_string),
        catalog_symbol: Some(symbol.to_string()),
        curated_symbol_check: curated.then(|| "checked".to_string()),
    }
}

pub fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    for row in [
        translation("HGNC:1100", Some("ENSG00000012048"), "BRCA1", false),
        translation("HGNC:1101", Some("ENSG00000139618"), "BRCA2", false),
        translation("HGNC:7127", Some("ENSG00000076242"), "MLH1", false),
        translation("HGNC:9122", Some("ENSG00000064933"), "PMS2", false),
        // Curated: the catalog symbol has no usable Ensembl mapping.
        translation("HGNC:16249", None, "ZFTA", true),
    ] {
        store.insert_translation(&row).unwrap();
    }
    store
}

pub fn app_in(dir: &Utf8Path) -> App<UnusedCatalog> {
    let config = ConfigLoader::resolve_config(Config {
        output_dir: Some(dir.to_path_buf()),
        checker_id: Some(CHECKER),
        ..Config::default()
    })
    .unwrap();
    App::new(config, UnusedCatalog)
}

pub fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, path)
}

/// Writes both snapshot files under `dir/<name>` and returns their paths.
pub fn write_snapshot(dir: &Utf8Path, name: &str, identifiers: &str, symbols: &str) -> SnapshotFiles {
    let files = SnapshotFiles {
        identifiers: dir.join(format!("{name}_ids.txt")),
        symbols: dir.join(format!("{name}_symbols.txt")),
    };
    std::fs::write(files.identifiers.as_std_path(), identifiers).unwrap();
    std::fs::write(files.symbols.as_std_path(), symbols).unwrap();
    files
}

/// One-line snapshot for panel `p1` ("Lynch syndrome", Green) at `version`.
pub fn lynch_snapshot(dir: &Utf8Path, version: &str) -> SnapshotFiles {
    write_snapshot(
        dir,
        &format!("lynch_{version}"),
        &format!(
            "p1_Lynch syndrome_{version}_Green:[\"'ENSG00000076242'\", \"'ENSG00000064933'\"]\n"
        ),
        &format!("p1_Lynch syndrome_{version}_Green_symbols:['MLH1', 'PMS2']\n"),
    )
}

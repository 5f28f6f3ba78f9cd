mod support;

use kira_panelsync::bootstrap::{ensure_category_marker, register_new_versions};
use kira_panelsync::config::DEFAULT_VERSION_CATEGORY;
use kira_panelsync::snapshot::parse_identifier_snapshot;
use kira_panelsync::store::{PanelStore, Selection, SqliteStore};

use support::seeded_store;

#[test]
fn schema_is_idempotent() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    store.ensure_schema().unwrap();
    assert_eq!(store.item_categories().unwrap(), Selection::NotFound);
}

#[test]
fn file_database_persists() {
    let temp = tempfile::tempdir().unwrap();
    let path = camino::Utf8PathBuf::from_path_buf(temp.path().join("moka.sqlite")).unwrap();
    {
        let store = SqliteStore::open(&path).unwrap();
        store.ensure_schema().unwrap();
        store.insert_item_category("NGS Panel version").unwrap();
    }
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(
        store.item_categories().unwrap(),
        Selection::Found(vec!["NGS Panel version".to_string()])
    );
}

#[test]
fn category_marker_is_created_once() {
    let store = seeded_store();
    let first = ensure_category_marker(&store, DEFAULT_VERSION_CATEGORY).unwrap();
    let second = ensure_category_marker(&store, DEFAULT_VERSION_CATEGORY).unwrap();
    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.id, second.id);
}

#[test]
fn versions_are_registered_once_in_canonical_form() {
    let store = seeded_store();
    let category = ensure_category_marker(&store, DEFAULT_VERSION_CATEGORY).unwrap();
    let records = parse_identifier_snapshot(
        "a_One_1_Green:[\"'ENSG00000012048'\"]\n\
         b_Two_1.0_Amber:[\"'ENSG00000012048'\"]\n\
         c_Three_0.50_Green:[\"'ENSG00000012048'\"]\n",
    )
    .unwrap();

    let inserted = register_new_versions(&store, &category, &records).unwrap();
    let again = register_new_versions(&store, &category, &records).unwrap();

    let inserted = inserted.iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(inserted, vec!["1.0", "0.5"]);
    assert!(again.is_empty());
    assert_eq!(
        store.items_in_category(category.id).unwrap().into_rows(),
        vec!["1.0", "0.5"]
    );
}

#[test]
fn translation_lookup() {
    let store = seeded_store();
    let gene = store
        .translate_ensembl_id("ENSG00000012048")
        .unwrap()
        .first()
        .unwrap();
    assert_eq!(gene.hgnc_id, "HGNC:1100");
    assert_eq!(gene.symbol, "BRCA1");
    assert_eq!(
        store.translate_ensembl_id("ENSG00000000000").unwrap(),
        Selection::NotFound
    );
}

#[test]
fn curated_overrides() {
    let store = seeded_store();
    assert_eq!(
        store.curated_symbols().unwrap(),
        Selection::Found(vec!["ZFTA".to_string()])
    );
    assert_eq!(
        store.curated_hgnc_id("ZFTA").unwrap().first().as_deref(),
        Some("HGNC:16249")
    );
}

#[test]
fn deactivation_only_touches_one_item() {
    let store = seeded_store();
    let version = store.insert_item("1.0", 99).unwrap();
    let first = store.insert_item("p1_Green", 48).unwrap();
    let second = store.insert_item("p2_Green", 48).unwrap();
    for (item, label) in [(first, "A_Green_1.0"), (second, "B_Green_1.0")] {
        store
            .insert_panel_record(&kira_panelsync::store::NewPanelRecord {
                panel_item_id: item,
                version_item_id: version,
                label,
                checker_id: 1,
            })
            .unwrap();
    }

    assert_eq!(store.deactivate_panel_records(first).unwrap(), 1);
    assert_eq!(store.deactivate_panel_records(first).unwrap(), 0);
    let active = store
        .panel_records()
        .unwrap()
        .into_iter()
        .filter(|record| record.active)
        .map(|record| record.label)
        .collect::<Vec<_>>();
    assert_eq!(active, vec!["B_Green_1.0"]);
}

mod support;

use kira_panelsync::audit::audit;
use kira_panelsync::config::DEFAULT_AUDIT_EXCLUSION;
use kira_panelsync::snapshot::parse_symbol_snapshot;

use support::{NoopSink, app_in, lynch_snapshot, seeded_store, temp_dir, write_snapshot};

#[test]
fn matching_panel_is_clean() {
    let (_temp, dir) = temp_dir();
    let store = seeded_store();
    let app = app_in(&dir);
    let files = lynch_snapshot(&dir, "0.1");
    app.load(&store, &files, &NoopSink).unwrap();

    let report = app.audit(&store, &files.symbols, &NoopSink).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.panels_checked, 1);
    assert_eq!(report.panels_excluded, 0);
}

#[test]
fn reports_both_directions() {
    let (_temp, dir) = temp_dir();
    let store = seeded_store();
    let app = app_in(&dir);
    app.load(&store, &lynch_snapshot(&dir, "0.1"), &NoopSink)
        .unwrap();

    // MLH1 dropped upstream, BRCA2 added, same version.
    let records = parse_symbol_snapshot("p1_Lynch syndrome_0.1_Green_symbols:['PMS2', 'BRCA2']\n")
        .unwrap();
    let report = audit(&store, &records, DEFAULT_AUDIT_EXCLUSION).unwrap();

    assert_eq!(report.discrepancies.len(), 1);
    let discrepancy = &report.discrepancies[0];
    assert_eq!(discrepancy.panel, "Lynch syndrome_Green_0.1");
    assert_eq!(discrepancy.missing_from_store, vec!["BRCA2"]);
    assert_eq!(discrepancy.missing_from_catalog, vec!["MLH1"]);
}

#[test]
fn unknown_panel_reports_all_symbols_missing() {
    let store = seeded_store();
    let records = parse_symbol_snapshot("p9_Unloaded_2.0_Amber_symbols:['BRCA1']\n").unwrap();

    let report = audit(&store, &records, DEFAULT_AUDIT_EXCLUSION).unwrap();

    assert_eq!(report.discrepancies[0].missing_from_store, vec!["BRCA1"]);
    assert!(report.discrepancies[0].missing_from_catalog.is_empty());
}

#[test]
fn excluded_prefix_is_not_reported() {
    let store = seeded_store();
    let records = parse_symbol_snapshot(
        "p7_Mitochondrial disorders_3.0_Green_symbols:['POLG']\n\
         p8_Mitochondrial disorders extended_1.0_Amber_symbols:['TWNK']\n\
         p9_Unloaded_2.0_Amber_symbols:['BRCA1']\n",
    )
    .unwrap();

    let report = audit(&store, &records, DEFAULT_AUDIT_EXCLUSION).unwrap();

    assert_eq!(report.panels_excluded, 2);
    assert_eq!(report.panels_checked, 1);
    assert_eq!(report.discrepancies.len(), 1);
    assert_eq!(report.discrepancies[0].panel, "Unloaded_Amber_2.0");
}

#[test]
fn empty_prefix_checks_everything() {
    let store = seeded_store();
    let records =
        parse_symbol_snapshot("p7_Mitochondrial disorders_3.0_Green_symbols:['POLG']\n").unwrap();

    let report = audit(&store, &records, "").unwrap();

    assert_eq!(report.panels_excluded, 0);
    assert_eq!(report.discrepancies.len(), 1);
}

#[test]
fn audit_does_not_write() {
    let (_temp, dir) = temp_dir();
    let store = seeded_store();
    let app = app_in(&dir);
    app.load(&store, &lynch_snapshot(&dir, "0.1"), &NoopSink)
        .unwrap();
    let before = store.panel_records().unwrap();
    let genes = store.panel_gene_count().unwrap();

    let files = write_snapshot(
        &dir,
        "drift",
        "",
        "p1_Lynch syndrome_0.1_Green_symbols:['MLH1', 'BRCA1']\n",
    );
    let report = app.audit(&store, &files.symbols, &NoopSink).unwrap();

    assert!(!report.is_clean());
    assert_eq!(store.panel_records().unwrap(), before);
    assert_eq!(store.panel_gene_count().unwrap(), genes);
}

use super::*;
use crate::report::Report;

fn s(text: &str) -> Option<String> {
    Some(text.to_string())
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn template_layout_joins_descriptive_columns() {
    let headers = headers(&["Well", "Cell Line", "Treatment"]);
    let body = vec![
        vec![s("A1"), s("HEK293"), s("Control")],
        vec![s("A2"), s("HEK293"), None],
        vec![None, s("orphan"), s("row")],
    ];
    let mut report = Report::new();
    let table = template::parse(&headers, &body, &mut report);

    assert_eq!(table.extra_columns, vec!["Cell Line", "Treatment"]);
    assert_eq!(table.entries.len(), 2);
    assert_eq!(
        table.lookup("A1").unwrap().well_group.as_deref(),
        Some("HEK293 Control")
    );
    assert_eq!(
        table.lookup("A2").unwrap().well_group.as_deref(),
        Some("HEK293")
    );
    assert_eq!(table.lookup("A1").unwrap().extra, vec![s("HEK293"), s("Control")]);
    assert!(report.mentions("no well label"));
}

#[test]
fn grid_layout_annotates_titration_columns_and_strips_ppb() {
    let headers = headers(&["Ab conc.\n[nM]", "Row", "1", "9"]);
    let body = vec![
        vec![s("0.5"), s("A"), s("mAb-7 (PPB-12)"), s("Control")],
        vec![s("2"), s("B"), s("mAb-7"), s("Untreated")],
    ];
    let mut report = Report::new();
    let table = grid::parse(&headers, &body, &mut report);

    // Titration column 1: PPB suffix stripped, concentration appended.
    assert_eq!(
        table.lookup("A1").unwrap().well_group.as_deref(),
        Some("mAb-7 (0.5 nM)")
    );
    assert_eq!(
        table.lookup("B1").unwrap().well_group.as_deref(),
        Some("mAb-7 (2 nM)")
    );
    // Column 9 is never annotated.
    assert_eq!(
        table.lookup("A9").unwrap().well_group.as_deref(),
        Some("Control")
    );
    assert_eq!(
        table.lookup("B9").unwrap().well_group.as_deref(),
        Some("Untreated")
    );
    // Two data rows do not cover A-H.
    assert!(report.mentions("expected A-H"));
}

#[test]
fn grid_layout_broadcasts_single_value_columns() {
    let headers = headers(&["Ab conc.\n[nM]", "Row", "9"]);
    let body = vec![
        vec![s("1"), s("A"), s("Global")],
        vec![s("1"), s("B"), None],
    ];
    let mut report = Report::new();
    let table = grid::parse(&headers, &body, &mut report);

    assert_eq!(table.lookup("A9").unwrap().well_group.as_deref(), Some("Global"));
    assert_eq!(table.lookup("B9").unwrap().well_group.as_deref(), Some("Global"));
}

#[test]
fn grid_layout_flags_bad_headers_and_concentrations() {
    let headers = headers(&["Conc", "Row", "13", "notacol"]);
    let body = vec![vec![s("abc"), s("A"), s("x"), s("y")]];
    let mut report = Report::new();
    let table = grid::parse(&headers, &body, &mut report);

    assert!(report.mentions("invalid plate-grid column name"));
    assert!(report.mentions("expected \"Ab conc.\\n[nM]\""));
    assert!(report.mentions("non-numeric values"));
    // Unparseable concentration renders as NaN in the annotation, data kept.
    assert!(table
        .lookup("A13")
        .is_some_and(|e| e.well_group.as_deref() == Some("x")));
}

#[test]
fn well_group_json_decodes_through_codec() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(WELL_GROUP_JSON);
    std::fs::write(
        &path,
        r#"{"AnalysisWellGroupsCollection": [
            {"GroupName": "G1", "SelectedWells": [{"Row": 0, "Column": 0}, {"Row": 0, "Column": 1}]},
            {"GroupName": "G2", "SelectedWells": [{"Row": 1, "Column": 0}]}
        ]}"#,
    )
    .unwrap();

    let mut report = Report::new();
    let table = resolve_metadata(dir.path(), &mut report).unwrap();

    assert_eq!(table.entries.len(), 3);
    assert_eq!(table.lookup("A1").unwrap().well_group.as_deref(), Some("G1"));
    assert_eq!(table.lookup("A2").unwrap().well_group.as_deref(), Some("G1"));
    assert_eq!(table.lookup("B1").unwrap().well_group.as_deref(), Some("G2"));
    assert!(!report.has_warnings());
}

#[test]
fn duplicate_well_across_groups_is_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(WELL_GROUP_JSON),
        r#"{"AnalysisWellGroupsCollection": [
            {"GroupName": "G1", "SelectedWells": [{"Row": 0, "Column": 0}]},
            {"GroupName": "G2", "SelectedWells": [{"Row": 0, "Column": 0}]}
        ]}"#,
    )
    .unwrap();

    let mut report = Report::new();
    let table = resolve_metadata(dir.path(), &mut report).unwrap();

    assert_eq!(table.lookup("A1").unwrap().well_group.as_deref(), Some("G2"));
    assert!(report.mentions("more than one group"));
}

#[test]
fn missing_metadata_source_degrades_to_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = Report::new();
    let table = resolve_metadata(dir.path(), &mut report).unwrap();

    assert!(table.is_empty());
    assert!(report.mentions("no JSON metadata file"));
}

#[test]
fn misnamed_json_degrades_to_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("groups.json"), "{}").unwrap();

    let mut report = Report::new();
    let table = resolve_metadata(dir.path(), &mut report).unwrap();

    assert!(table.is_empty());
    assert!(report.mentions(WELL_GROUP_JSON));
}

use rcx_rs::storage::{self, FILTERED_CSV_FILENAME};
use rcx_rs::{Row, Table};
use std::fs;

fn sample() -> Table {
    Table::from(vec![
        Row {
            common_name: Some("Chile".into()),
            region: Some("Americas".into()),
            population: 19_116_209,
            area: 756_102.5,
            border_count: 3,
            official_language_count: 1,
            timezone_count: 2,
        },
        Row {
            common_name: Some("Nowhere, Island".into()),
            ..Row::default()
        },
    ])
}

#[test]
fn csv_has_header_and_one_line_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(FILTERED_CSV_FILENAME);
    storage::save_csv(&sample(), &path).unwrap();
    let txt = fs::read_to_string(&path).unwrap();
    let mut lines = txt.lines();
    assert_eq!(
        lines.next(),
        Some(
            "common_name,region,population,area,border_count,\
             official_language_count,timezone_count"
        )
    );
    assert_eq!(lines.next(), Some("Chile,Americas,19116209,756102.5,3,1,2"));
    // Missing region is an empty cell; embedded commas are quoted.
    let second = lines.next().unwrap();
    assert!(second.starts_with("\"Nowhere, Island\",,0,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn csv_bytes_match_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let table = sample();
    storage::save_csv(&table, &path).unwrap();
    assert_eq!(storage::csv_bytes(&table).unwrap(), fs::read(&path).unwrap());
}

#[test]
fn empty_table_writes_header_only() {
    let bytes = storage::csv_bytes(&Table::empty()).unwrap();
    let txt = String::from_utf8(bytes).unwrap();
    assert_eq!(txt.lines().count(), 1);
}

#[test]
fn json_is_an_array_of_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    storage::save_json(&sample(), &path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["common_name"], "Chile");
    assert!(rows[1]["region"].is_null());
}

#[test]
fn save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no/such/dir/out.csv");
    assert!(storage::save_csv(&sample(), &path).is_err());
}

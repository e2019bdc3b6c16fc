use crate::models::{Field, Row};
use crate::table::Table;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// File name used when exporting a (filtered) table as CSV.
pub const FILTERED_CSV_FILENAME: &str = "filtered_countries.csv";
/// File name used when exporting a rendered chart.
pub const CHART_PNG_FILENAME: &str = "chart.png";

fn write_rows<W: Write>(table: &Table, sink: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(sink);
    wtr.write_record(Field::ALL.iter().map(|f| f.key()))?;
    for r in table {
        wtr.serialize(row_tuple(r))?;
    }
    wtr.flush()?;
    Ok(())
}

fn row_tuple(r: &Row) -> (&Option<String>, &Option<String>, i64, f64, usize, usize, usize) {
    (
        &r.common_name,
        &r.region,
        r.population,
        r.area,
        r.border_count,
        r.official_language_count,
        r.timezone_count,
    )
}

/// Table as CSV bytes with a header line. Missing text becomes an empty cell.
pub fn csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_rows(table, &mut buf)?;
    Ok(buf)
}

/// Save a table as CSV with header.
pub fn save_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_rows(table, f).with_context(|| format!("write CSV to {}", path.display()))
}

/// Save a table as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(table)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join(FILTERED_CSV_FILENAME);
        let jsonp = dir.path().join("x.json");
        let table = Table::from(vec![Row {
            common_name: Some("Chile".into()),
            region: None,
            population: 19_116_209,
            area: 756_102.0,
            border_count: 3,
            official_language_count: 1,
            timezone_count: 1,
        }]);
        save_csv(&table, &csvp).unwrap();
        save_json(&table, &jsonp).unwrap();
        assert!(csvp.exists());
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&jsonp).unwrap()).unwrap();
        assert_eq!(json[0]["region"], serde_json::Value::Null);
        assert_eq!(json[0]["population"], 19_116_209);
    }
}

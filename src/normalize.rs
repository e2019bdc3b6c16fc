//! Raw country objects → fixed-shape [`Row`]s.
//!
//! Every column is described by one [`FieldRule`]: where to look in the raw
//! object and how to reduce what is found there. Anything missing, null, or of
//! the wrong shape degrades to the column default; normalization never fails.

use crate::models::{Field, RawRecord, Row};
use crate::table::Table;
use serde_json::Value;

/// How a located JSON value turns into a column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Take the value itself.
    Identity,
    /// Number of elements of a list.
    Length,
    /// Number of entries of a mapping.
    Size,
}

/// Extraction rule for one column.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    /// Nested object keys, outermost first.
    pub path: &'static [&'static str],
    pub aggregation: Aggregation,
}

pub const FIELD_RULES: [FieldRule; 7] = [
    FieldRule {
        field: Field::CommonName,
        path: &["name", "common"],
        aggregation: Aggregation::Identity,
    },
    FieldRule {
        field: Field::Region,
        path: &["region"],
        aggregation: Aggregation::Identity,
    },
    FieldRule {
        field: Field::Population,
        path: &["population"],
        aggregation: Aggregation::Identity,
    },
    FieldRule {
        field: Field::Area,
        path: &["area"],
        aggregation: Aggregation::Identity,
    },
    FieldRule {
        field: Field::BorderCount,
        path: &["borders"],
        aggregation: Aggregation::Length,
    },
    FieldRule {
        field: Field::OfficialLanguageCount,
        path: &["languages"],
        aggregation: Aggregation::Size,
    },
    FieldRule {
        field: Field::TimezoneCount,
        path: &["timezones"],
        aggregation: Aggregation::Length,
    },
];

/// Walk `path` through nested objects. Null counts as absent.
fn lookup<'a>(record: &'a RawRecord, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut cur = record.get(*first)?;
    for key in rest {
        cur = cur.as_object()?.get(*key)?;
    }
    (!cur.is_null()).then_some(cur)
}

fn count(value: Option<&Value>, aggregation: Aggregation) -> usize {
    match (aggregation, value) {
        (Aggregation::Length, Some(Value::Array(items))) => items.len(),
        (Aggregation::Size, Some(Value::Object(entries))) => entries.len(),
        _ => 0,
    }
}

fn as_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn as_float(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

fn as_text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

impl FieldRule {
    fn apply(&self, record: &RawRecord, row: &mut Row) {
        let found = lookup(record, self.path);
        let n = count(found, self.aggregation);
        match self.field {
            Field::CommonName => row.common_name = as_text(found),
            Field::Region => row.region = as_text(found),
            Field::Population => row.population = as_int(found),
            Field::Area => row.area = as_float(found),
            Field::BorderCount => row.border_count = n,
            Field::OfficialLanguageCount => row.official_language_count = n,
            Field::TimezoneCount => row.timezone_count = n,
        }
    }
}

/// Normalize a single record.
pub fn normalize_record(record: &RawRecord) -> Row {
    let mut row = Row::default();
    for rule in &FIELD_RULES {
        rule.apply(record, &mut row);
    }
    row
}

/// Normalize records into a table with one row per record, in order.
pub fn normalize(records: &[RawRecord]) -> Table {
    records.iter().map(normalize_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> RawRecord {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn every_field_has_exactly_one_rule() {
        for field in Field::ALL {
            assert_eq!(FIELD_RULES.iter().filter(|r| r.field == field).count(), 1, "{field}");
        }
    }

    #[test]
    fn lookup_treats_null_and_non_objects_as_absent() {
        let r = rec(json!({"name": null, "region": null, "x": {"y": 1}}));
        assert!(lookup(&r, &["name", "common"]).is_none());
        assert!(lookup(&r, &["region"]).is_none());
        assert_eq!(lookup(&r, &["x", "y"]), Some(&json!(1)));
        let r = rec(json!({"name": "Chile"}));
        assert!(lookup(&r, &["name", "common"]).is_none());
    }

    #[test]
    fn integer_coercion_truncates_floats_and_rejects_strings() {
        assert_eq!(as_int(Some(&json!(12.9))), 12);
        assert_eq!(as_int(Some(&json!("12"))), 0);
        assert_eq!(as_int(Some(&json!(u64::MAX))), i64::MAX);
        assert_eq!(as_int(None), 0);
    }

    #[test]
    fn counts_only_match_their_shape() {
        assert_eq!(count(Some(&json!(["a", "b"])), Aggregation::Length), 2);
        assert_eq!(count(Some(&json!({"a": 1})), Aggregation::Length), 0);
        assert_eq!(count(Some(&json!({"a": 1, "b": 2})), Aggregation::Size), 2);
        assert_eq!(count(Some(&json!(["a"])), Aggregation::Size), 0);
        assert_eq!(count(Some(&json!("abc")), Aggregation::Identity), 0);
    }
}

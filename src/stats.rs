use crate::models::{Cell, Field};
use crate::table::Table;
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericSummary {
    pub field: Field,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1); undefined below two values.
    pub std_dev: Option<f64>,
}

/// Summary for a text column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextSummary {
    pub field: Field,
    pub count: usize,
    pub missing: usize,
    pub distinct: usize,
    pub most_common: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Text(TextSummary),
}

/// Summarize one column. `None` when the table is empty.
pub fn summarize(table: &Table, field: Field) -> Option<ColumnSummary> {
    if table.is_empty() {
        return None;
    }
    if field.is_numeric() {
        let values = table.numeric_column(field)?;
        numeric_summary(field, values).map(ColumnSummary::Numeric)
    } else {
        Some(ColumnSummary::Text(text_summary(field, &table.column(field))))
    }
}

fn numeric_summary(field: Field, mut vals: Vec<f64>) -> Option<NumericSummary> {
    vals.sort_by(|a, b| a.total_cmp(b));
    let count = vals.len();
    let min = *vals.first()?;
    let max = *vals.last()?;
    let mean = vals.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        vals[count / 2]
    } else {
        (vals[count / 2 - 1] + vals[count / 2]) / 2.0
    };
    let std_dev = (count > 1).then(|| {
        let var = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    });
    Some(NumericSummary {
        field,
        count,
        min,
        max,
        mean,
        median,
        std_dev,
    })
}

fn text_summary(field: Field, cells: &[Cell]) -> TextSummary {
    let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
    let mut missing = 0;
    for cell in cells {
        match cell {
            Cell::Text(Some(s)) => *freq.entry(s.as_str()).or_default() += 1,
            _ => missing += 1,
        }
    }
    // BTreeMap iterates alphabetically, so the first maximum wins ties.
    let most_common = freq
        .iter()
        .fold(None::<(&str, usize)>, |best, (k, n)| match best {
            Some((_, b)) if b >= *n => best,
            _ => Some((*k, *n)),
        })
        .map(|(k, _)| k.to_string());
    TextSummary {
        field,
        count: cells.len() - missing,
        missing,
        distinct: freq.len(),
        most_common,
    }
}

/// Two decimals with thousands separators, e.g. `19,116,209.00`; `NA` when not finite.
pub fn format_number(v: f64) -> String {
    if !v.is_finite() {
        return "NA".to_string();
    }
    let cents = (v.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc() as i64;
    let frac = (cents % 100.0) as i64;
    let sign = if v < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}{}.{frac:02}", whole.to_formatted_string(&Locale::en))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_get_separators_and_two_decimals() {
        assert_eq!(format_number(19_116_209.0), "19,116,209.00");
        assert_eq!(format_number(-1234.567), "-1,234.57");
        assert_eq!(format_number(0.004), "0.00");
        assert_eq!(format_number(f64::NAN), "NA");
    }

    #[test]
    fn most_common_breaks_ties_alphabetically() {
        let cells = vec![
            Cell::Text(Some("Europe".into())),
            Cell::Text(Some("Africa".into())),
            Cell::Text(None),
            Cell::Text(Some("Europe".into())),
            Cell::Text(Some("Africa".into())),
        ];
        let s = text_summary(Field::Region, &cells);
        assert_eq!(s.count, 4);
        assert_eq!(s.missing, 1);
        assert_eq!(s.distinct, 2);
        assert_eq!(s.most_common.as_deref(), Some("Africa"));
    }
}

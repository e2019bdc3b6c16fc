//! The normalized table and the derived views built from it.
//!
//! A [`Table`] never changes after construction. Sorting and filtering return
//! new tables, so several views of one fetch can coexist without aliasing.

use crate::models::{Cell, Field, Row};
use serde::Serialize;
use std::cmp::Ordering;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Ordered rows derived from one fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn column(&self, field: Field) -> Vec<Cell> {
        self.rows.iter().map(|r| r.get(field)).collect()
    }

    /// `None` for text columns.
    pub fn numeric_column(&self, field: Field) -> Option<Vec<f64>> {
        if !field.is_numeric() {
            return None;
        }
        Some(self.rows.iter().filter_map(|r| r.numeric(field)).collect())
    }

    /// Stable sort on one column. Missing text goes last in both directions.
    pub fn sorted_by(&self, field: Field, order: SortOrder) -> Table {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| compare_cells(&a.get(field), &b.get(field), order));
        Table { rows }
    }

    /// Rows with `min <= population <= max`, in their original order.
    pub fn filter_population(&self, min: i64, max: i64) -> Table {
        self.rows
            .iter()
            .filter(|r| (min..=max).contains(&r.population))
            .cloned()
            .collect()
    }

    /// Smallest and largest population, for initialising range selectors.
    pub fn population_bounds(&self) -> Option<(i64, i64)> {
        let min = self.rows.iter().map(|r| r.population).min()?;
        let max = self.rows.iter().map(|r| r.population).max()?;
        Some((min, max))
    }

    /// First `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        self.rows.iter().take(n).cloned().collect()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn compare_cells(a: &Cell, b: &Cell, order: SortOrder) -> Ordering {
    let directed = |o: Ordering| match order {
        SortOrder::Ascending => o,
        SortOrder::Descending => o.reverse(),
    };
    match (a, b) {
        (Cell::Text(None), Cell::Text(None)) => Ordering::Equal,
        (Cell::Text(None), _) => Ordering::Greater,
        (_, Cell::Text(None)) => Ordering::Less,
        (Cell::Text(Some(x)), Cell::Text(Some(y))) => directed(x.cmp(y)),
        (Cell::Int(x), Cell::Int(y)) => directed(x.cmp(y)),
        _ => {
            let x = a.as_f64().unwrap_or(0.0);
            let y = b.as_f64().unwrap_or(0.0);
            directed(x.total_cmp(&y))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: Option<&str>) -> Cell {
        Cell::Text(name.map(str::to_string))
    }

    #[test]
    fn missing_text_sorts_last_both_ways() {
        let none = named(None);
        let a = named(Some("a"));
        assert_eq!(compare_cells(&none, &a, SortOrder::Ascending), Ordering::Greater);
        assert_eq!(compare_cells(&none, &a, SortOrder::Descending), Ordering::Greater);
        assert_eq!(compare_cells(&a, &none, SortOrder::Descending), Ordering::Less);
    }

    #[test]
    fn floats_compare_totally() {
        let lo = Cell::Float(-0.5);
        let hi = Cell::Float(2.0);
        assert_eq!(compare_cells(&lo, &hi, SortOrder::Ascending), Ordering::Less);
        assert_eq!(compare_cells(&lo, &hi, SortOrder::Descending), Ordering::Greater);
    }
}

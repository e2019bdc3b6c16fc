use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One country object as served by the source. Nothing about its shape is guaranteed.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Normalized, fixed-shape country row (one row = one country).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Row {
    pub common_name: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub area: f64,
    pub border_count: usize,
    pub official_language_count: usize,
    pub timezone_count: usize,
}

/// The seven columns of a [`Row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CommonName,
    Region,
    Population,
    Area,
    BorderCount,
    OfficialLanguageCount,
    TimezoneCount,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::CommonName,
        Field::Region,
        Field::Population,
        Field::Area,
        Field::BorderCount,
        Field::OfficialLanguageCount,
        Field::TimezoneCount,
    ];

    /// Columns that can be charted on a numeric axis.
    pub const NUMERIC: [Field; 5] = [
        Field::Population,
        Field::Area,
        Field::BorderCount,
        Field::OfficialLanguageCount,
        Field::TimezoneCount,
    ];

    /// Stable snake_case key, also used as the CSV header.
    pub fn key(self) -> &'static str {
        match self {
            Field::CommonName => "common_name",
            Field::Region => "region",
            Field::Population => "population",
            Field::Area => "area",
            Field::BorderCount => "border_count",
            Field::OfficialLanguageCount => "official_language_count",
            Field::TimezoneCount => "timezone_count",
        }
    }

    /// Human-readable column title.
    pub fn label(self) -> &'static str {
        match self {
            Field::CommonName => "Common name",
            Field::Region => "Region",
            Field::Population => "Population",
            Field::Area => "Area (km²)",
            Field::BorderCount => "Borders",
            Field::OfficialLanguageCount => "Official languages",
            Field::TimezoneCount => "Time zones",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Field::CommonName | Field::Region)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts the snake_case key or the same with dashes, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Field::ALL
            .into_iter()
            .find(|f| f.key() == wanted)
            .ok_or_else(|| {
                let keys: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
                format!("unknown field '{s}', expected one of: {}", keys.join(", "))
            })
    }
}

/// The value of one field of one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(Option<String>),
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Text(_) => None,
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
        }
    }

    /// Display form; missing text renders as `NA`.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(Some(s)) => s.clone(),
            Cell::Text(None) => "NA".to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
        }
    }
}

impl Row {
    pub fn get(&self, field: Field) -> Cell {
        match field {
            Field::CommonName => Cell::Text(self.common_name.clone()),
            Field::Region => Cell::Text(self.region.clone()),
            Field::Population => Cell::Int(self.population),
            Field::Area => Cell::Float(self.area),
            Field::BorderCount => Cell::Int(self.border_count as i64),
            Field::OfficialLanguageCount => Cell::Int(self.official_language_count as i64),
            Field::TimezoneCount => Cell::Int(self.timezone_count as i64),
        }
    }

    pub fn numeric(&self, field: Field) -> Option<f64> {
        self.get(field).as_f64()
    }
}

//! Public types for the chart module.

use crate::models::Field;
use std::fmt;

/// Chart kinds offered to the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    /// Markers only (default).
    #[default]
    Scatter,
    /// Line through the points in table order, with markers.
    Line,
    /// One bar per row, centred on its x value.
    Bar,
    /// Slices sized by y, labelled by x.
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Scatter,
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Scatter => "Scatter",
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
            ChartKind::Pie => "Pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to draw: axes, kind, optional axis-range overrides and title.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub x: Field,
    pub y: Field,
    pub kind: ChartKind,
    /// Inclusive x-axis range in data units; computed from the data when `None`.
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub title: Option<String>,
}

impl ChartSpec {
    pub fn new(x: Field, y: Field, kind: ChartKind) -> Self {
        Self {
            x,
            y,
            kind,
            x_range: None,
            y_range: None,
            title: None,
        }
    }

    pub fn with_x_range(mut self, lo: f64, hi: f64) -> Self {
        self.x_range = Some((lo, hi));
        self
    }

    pub fn with_y_range(mut self, lo: f64, hi: f64) -> Self {
        self.y_range = Some((lo, hi));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Custom title, or "<Kind> of <x> and <y>".
    pub fn resolved_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("{} of {} and {}", self.kind, self.x.label(), self.y.label()),
        }
    }
}

/// Default canvas size.
pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 600;

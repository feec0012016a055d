//! Chart Requests
//!
//! Chart kinds, per-kind column requirements and the rendered artifact type.
//! Rendering itself is done by a `ChartRenderer` implementation.

use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::table::Table;

pub const DEFAULT_CHART_COLOR: &str = "#1f77b4";
pub const DEFAULT_CHART_HEIGHT: u32 = 500;
pub const MIN_CHART_HEIGHT: u32 = 300;
pub const MAX_CHART_HEIGHT: u32 = 1000;

/// Supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Pie,
    Histogram,
    Box,
    Heatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Histogram,
        ChartKind::Box,
        ChartKind::Heatmap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Histogram => "Histogram",
            ChartKind::Box => "Box Plot",
            ChartKind::Heatmap => "Heatmap",
        }
    }

    /// Human-readable column requirement, shown next to the field pickers.
    pub fn requirement(self) -> &'static str {
        match self {
            ChartKind::Bar | ChartKind::Line => "X axis, optionally one or more Y columns",
            ChartKind::Scatter | ChartKind::Box => "X axis, optionally one Y column",
            ChartKind::Pie => "Names column, optionally a values column",
            ChartKind::Histogram => "X axis only",
            ChartKind::Heatmap => "X and Y categorical columns plus a numeric value column (mean)",
        }
    }

    /// Number of `y_fields` the kind reads; `None` means any number.
    fn max_y_fields(self) -> Option<usize> {
        match self {
            ChartKind::Bar | ChartKind::Line => None,
            ChartKind::Scatter | ChartKind::Box | ChartKind::Pie => Some(1),
            ChartKind::Histogram => Some(0),
            ChartKind::Heatmap => Some(2),
        }
    }
}

/// Presentation options for a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_color() -> String {
    DEFAULT_CHART_COLOR.to_string()
}

fn default_height() -> u32 {
    DEFAULT_CHART_HEIGHT
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: None,
            color: default_color(),
            height: default_height(),
        }
    }
}

/// A request to chart the visualization result.
///
/// For heatmaps `y_fields` is `[y_axis, value_column]`; for pie charts the
/// first y field is the values column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x_field: String,
    #[serde(default)]
    pub y_fields: Vec<String>,
    #[serde(default)]
    pub options: ChartOptions,
}

impl ChartRequest {
    pub fn new(kind: ChartKind, x_field: impl Into<String>) -> Self {
        Self {
            kind,
            x_field: x_field.into(),
            y_fields: Vec::new(),
            options: ChartOptions::default(),
        }
    }

    pub fn with_y(mut self, field: impl Into<String>) -> Self {
        self.y_fields.push(field.into());
        self
    }

    /// Default field picks for a result: first column on X, then the
    /// following columns for whatever else the kind needs.
    pub fn with_defaults(kind: ChartKind, columns: &[String]) -> Option<Self> {
        let first = columns.first()?;
        let pick = |i: usize| columns[i.min(columns.len() - 1)].clone();
        let y_fields = match kind {
            ChartKind::Histogram => Vec::new(),
            ChartKind::Heatmap => vec![pick(1), pick(2)],
            _ => vec![pick(1)],
        };
        Some(Self {
            kind,
            x_field: first.clone(),
            y_fields,
            options: ChartOptions::default(),
        })
    }

    /// Title to display: the explicit one or "<Kind> of <x>".
    pub fn title(&self) -> String {
        self.options
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("{} of {}", self.kind.label(), self.x_field))
    }

    /// Height clamped to the supported range.
    pub fn height(&self) -> u32 {
        self.options.height.clamp(MIN_CHART_HEIGHT, MAX_CHART_HEIGHT)
    }

    /// The y fields the kind actually uses.
    pub fn used_y_fields(&self) -> &[String] {
        match self.kind.max_y_fields() {
            Some(max) => &self.y_fields[..self.y_fields.len().min(max)],
            None => &self.y_fields,
        }
    }

    /// Check that every used column exists and the kind has what it needs.
    pub fn validate(&self, table: &Table) -> Result<(), ChartError> {
        let known = |name: &String| {
            table
                .column_index(name)
                .map(|_| ())
                .ok_or_else(|| ChartError::UnknownColumn(name.clone()))
        };
        known(&self.x_field)?;
        for field in self.used_y_fields() {
            known(field)?;
        }

        if self.kind == ChartKind::Heatmap {
            match self.y_fields.len() {
                0 => return Err(ChartError::MissingField("y axis".to_string())),
                1 => return Err(ChartError::MissingField("value".to_string())),
                _ => {}
            }
        }
        Ok(())
    }
}

/// A rendered chart: a figure document the frontend can draw or download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub title: String,
    pub figure: serde_json::Value,
}

impl ChartArtifact {
    /// Download name derived from the title.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.title.replace(' ', "_"))
    }
}

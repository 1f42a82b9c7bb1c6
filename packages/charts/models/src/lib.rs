#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chart configuration and chart model types.
//!
//! [`ChartConfig`] is the declarative description of one chart, stored as
//! JSON on a saved chart and posted by the chart editor. [`ChartModel`] is
//! the renderer-agnostic output the builders produce: the frontend maps
//! its `type` to a bar/line/pie/table rendering and each series key to a
//! visual channel, without further data transformation.
//!
//! The config is a tagged union discriminated by `type`; required fields
//! per variant are enforced by deserialization, so a config missing e.g.
//! its `category` never reaches a builder.

use std::collections::BTreeMap;

use flyttstat_models::{CategoryDimension, FilterPredicate, Measure};
use serde::{Deserialize, Serialize};

/// How a chart model should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Vertical bars, one per dimension value.
    Column,
    /// Horizontal bars.
    Bar,
    /// Pie with one slice per dimension value.
    Pie,
    /// One line per series over the dimension.
    Line,
}

/// Renderable chart kind choices for a category chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryChartKind {
    /// Render as a pie chart.
    Pie,
    /// Render as a bar chart.
    Bar,
}

impl From<CategoryChartKind> for ChartKind {
    fn from(kind: CategoryChartKind) -> Self {
        match kind {
            CategoryChartKind::Pie => Self::Pie,
            CategoryChartKind::Bar => Self::Bar,
        }
    }
}

/// Whether series values are raw counts or normalized percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureCalculation {
    /// Raw counts.
    Volume,
    /// Counts normalized to sum to 100 within each temporal point.
    Percent,
}

/// Counts per year for a single measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalChartConfig {
    /// Explicit title; generated from the config when absent or empty.
    #[serde(default)]
    pub title: Option<String>,
    /// Per-chart filters kept by the editor; opaque to the builders,
    /// which receive the effective filter list separately.
    #[serde(default)]
    pub filters: Option<Vec<FilterPredicate>>,
    /// Presentation-only settings, passed through unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_settings: Option<serde_json::Value>,
    /// Flow direction to count.
    pub measure: Measure,
}

/// Counts per category for a single measure, as a pie or bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryChartConfig {
    /// Explicit title; generated from the config when absent or empty.
    #[serde(default)]
    pub title: Option<String>,
    /// Per-chart filters kept by the editor.
    #[serde(default)]
    pub filters: Option<Vec<FilterPredicate>>,
    /// Presentation-only settings, passed through unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_settings: Option<serde_json::Value>,
    /// Flow direction to count.
    pub measure: Measure,
    /// Dimension to break the measure down by.
    pub category: CategoryDimension,
    /// Number of categories to keep before collapsing or truncating.
    pub max_number_of_categories: usize,
    /// Collapse categories beyond the top N into one "Övrigt" bucket
    /// instead of dropping them.
    pub combine_remaining_categories: bool,
    /// Pie or bar rendering.
    pub chart_type: CategoryChartKind,
}

/// Counts per year, one series per top category, as a line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalCategoryChartConfig {
    /// Explicit title; generated from the config when absent or empty.
    #[serde(default)]
    pub title: Option<String>,
    /// Per-chart filters kept by the editor.
    #[serde(default)]
    pub filters: Option<Vec<FilterPredicate>>,
    /// Presentation-only settings, passed through unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_settings: Option<serde_json::Value>,
    /// Flow direction to count.
    pub measure: Measure,
    /// Dimension to break the measure down by.
    pub category: CategoryDimension,
    /// Number of categories retained as series.
    pub max_number_of_categories: usize,
    /// Collapse the remaining categories into an "Övrigt" series.
    pub combine_remaining_categories: bool,
    /// Raw counts or per-year percentages.
    pub measure_calculation: MeasureCalculation,
}

/// Inflow, outflow, and net flow per year for an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetFlowChartConfig {
    /// Explicit title; generated from the config when absent or empty.
    #[serde(default)]
    pub title: Option<String>,
    /// Per-chart filters kept by the editor.
    #[serde(default)]
    pub filters: Option<Vec<FilterPredicate>>,
    /// Presentation-only settings, passed through unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_settings: Option<serde_json::Value>,
}

/// Declarative configuration of one chart, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChartConfig {
    /// Counts per year.
    #[serde(rename = "temporal")]
    Temporal(TemporalChartConfig),
    /// Counts per category.
    #[serde(rename = "category")]
    Category(CategoryChartConfig),
    /// Counts per year and category.
    #[serde(rename = "temporal+category")]
    TemporalCategory(TemporalCategoryChartConfig),
    /// Inflow minus outflow per year.
    #[serde(rename = "netflow")]
    NetFlow(NetFlowChartConfig),
}

impl ChartConfig {
    /// The explicit title, if one was configured and is non-empty.
    #[must_use]
    pub fn explicit_title(&self) -> Option<&str> {
        let title = match self {
            Self::Temporal(c) => c.title.as_deref(),
            Self::Category(c) => c.title.as_deref(),
            Self::TemporalCategory(c) => c.title.as_deref(),
            Self::NetFlow(c) => c.title.as_deref(),
        };
        title.filter(|t| !t.trim().is_empty())
    }

    /// The filter predicates configured on the chart itself, if any.
    #[must_use]
    pub fn filters(&self) -> &[FilterPredicate] {
        let filters = match self {
            Self::Temporal(c) => c.filters.as_deref(),
            Self::Category(c) => c.filters.as_deref(),
            Self::TemporalCategory(c) => c.filters.as_deref(),
            Self::NetFlow(c) => c.filters.as_deref(),
        };
        filters.unwrap_or_default()
    }

    /// The presentation pass-through payload, if configured.
    #[must_use]
    pub const fn ui_settings(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Temporal(c) => c.ui_settings.as_ref(),
            Self::Category(c) => c.ui_settings.as_ref(),
            Self::TemporalCategory(c) => c.ui_settings.as_ref(),
            Self::NetFlow(c) => c.ui_settings.as_ref(),
        }
    }
}

/// A value in a chart data point: the dimension's label or a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    /// A series value.
    Count(i64),
    /// The dimension label of the point.
    Label(String),
}

/// One data point: the dimension key mapped to its label plus one entry
/// per series key mapped to a count.
pub type ChartDataPoint = BTreeMap<String, PointValue>;

/// Renderer-agnostic output of a chart builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartModel {
    /// Human-readable chart title.
    pub title: String,
    /// How the chart should be rendered.
    #[serde(rename = "type")]
    pub kind: ChartKind,
    /// Measure the chart was built for.
    pub measure: Measure,
    /// Key of the dimension field in each data point.
    pub dimension: String,
    /// Series keys present in the data points.
    pub series: Vec<String>,
    /// Data points, in dimension order.
    pub data: Vec<ChartDataPoint>,
    /// Presentation settings forwarded verbatim from the config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_settings: Option<serde_json::Value>,
}

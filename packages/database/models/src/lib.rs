#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types for the flyttstat backend.
//!
//! These represent data as retrieved from Postgres: aggregate rows from
//! the group-by-count queries over the `relocation` table, and the
//! report/chart rows that persist user-built reports. They are distinct
//! from the API response types in `flyttstat_server_models`.

use chrono::NaiveDateTime;
use flyttstat_chart_models::ChartConfig;
use flyttstat_models::FilterPredicate;
use serde::{Deserialize, Serialize};

/// Count of relocation events for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    /// Relocation year.
    pub year: i32,
    /// Number of matching events.
    pub count: i64,
}

/// Count of relocation events for one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category label (e.g. an industry cluster or a municipality).
    pub key: String,
    /// Number of matching events.
    pub count: i64,
}

/// Count of relocation events for one (year, category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCategoryCount {
    /// Relocation year.
    pub year: i32,
    /// Category label.
    pub category: String,
    /// Number of matching events.
    pub count: i64,
}

/// Distinct values available per filter dimension, used to populate the
/// filter selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Years with at least one relocation event.
    pub years: Vec<i32>,
    /// Employee-range buckets, in bucket (numeric lower bound) order.
    pub employee_ranges: Vec<String>,
    /// Company types, alphabetical.
    pub company_types: Vec<String>,
    /// Industry clusters, alphabetical.
    pub industry_clusters: Vec<String>,
}

/// A saved report: an owning user, an optional area of interest, and the
/// dimensional filters applied to every chart in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Primary key (UUID).
    pub id: String,
    /// Opaque id of the owning user.
    pub user_id: String,
    /// Report title.
    pub title: String,
    /// Area of interest, if the report is scoped to one.
    pub location: Option<String>,
    /// Dimensional filters applied to all charts in the report.
    pub filters: Vec<FilterPredicate>,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
    /// Last-update timestamp.
    pub updated_at: NaiveDateTime,
}

/// A saved chart: its parent report and the chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    /// Primary key (UUID).
    pub id: String,
    /// Report this chart belongs to.
    pub report_id: String,
    /// Declarative chart configuration.
    pub config: ChartConfig,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
}

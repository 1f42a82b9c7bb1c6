#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the relocation statistics server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types to allow independent evolution of the API
//! contract.

use flyttstat_chart_models::{ChartConfig, ChartModel};
use flyttstat_database_models::{ChartRow, FilterOptions, ReportRow};
use flyttstat_models::FilterPredicate;
use serde::{Deserialize, Serialize};

/// A saved report as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReport {
    /// Unique report ID.
    pub id: String,
    /// Report title.
    pub title: String,
    /// Area of interest, lowercased, if the report is scoped to one.
    pub location: Option<String>,
    /// Report-level filter predicates applied to every chart.
    pub filters: Vec<FilterPredicate>,
    /// Creation time (ISO 8601).
    pub created_at: String,
    /// Last modification time (ISO 8601).
    pub updated_at: String,
}

impl From<ReportRow> for ApiReport {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            location: row.location,
            filters: row.filters,
            created_at: row.created_at.and_utc().to_rfc3339(),
            updated_at: row.updated_at.and_utc().to_rfc3339(),
        }
    }
}

/// A saved chart as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiChart {
    /// Unique chart ID.
    pub id: String,
    /// Owning report ID.
    pub report_id: String,
    /// The chart's configuration.
    pub config: ChartConfig,
    /// Creation time (ISO 8601).
    pub created_at: String,
}

impl From<ChartRow> for ApiChart {
    fn from(row: ChartRow) -> Self {
        Self {
            id: row.id,
            report_id: row.report_id,
            config: row.config,
            created_at: row.created_at.and_utc().to_rfc3339(),
        }
    }
}

/// A saved report together with its built charts, ready to render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReportView {
    /// The report itself.
    pub report: ApiReport,
    /// The report's charts, in saved order, each built into a model.
    pub charts: Vec<ApiReportChart>,
}

/// One chart of a report view: the saved configuration plus the model
/// built from the current dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReportChart {
    /// Unique chart ID.
    pub id: String,
    /// The chart's configuration.
    pub config: ChartConfig,
    /// The built, renderer-agnostic chart model.
    pub chart: ChartModel,
}

/// Request body for creating a report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    /// Report title.
    pub title: String,
    /// Area of interest; case-insensitive, stored lowercased.
    pub location: Option<String>,
    /// Report-level filter predicates.
    #[serde(default)]
    pub filters: Option<Vec<FilterPredicate>>,
}

/// Request body for adding a chart to a report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChartRequest {
    /// The chart's configuration.
    pub config: ChartConfig,
}

/// Request body for previewing a chart without saving it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewChartRequest {
    /// Area of interest; case-insensitive.
    pub location: Option<String>,
    /// Filter predicates applied on top of the configuration.
    #[serde(default)]
    pub filters: Option<Vec<FilterPredicate>>,
    /// The chart's configuration.
    pub config: ChartConfig,
}

/// Distinct filter values as returned by the filter options endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFilterOptions {
    /// Relocation years with at least one event, ascending.
    pub years: Vec<i32>,
    /// Employee-range buckets in bucket order.
    pub employee_ranges: Vec<String>,
    /// Company types, alphabetical.
    pub company_types: Vec<String>,
    /// Industry clusters, alphabetical.
    pub industry_clusters: Vec<String>,
}

impl From<FilterOptions> for ApiFilterOptions {
    fn from(options: FilterOptions) -> Self {
        Self {
            years: options.years,
            employee_ranges: options.employee_ranges,
            company_types: options.company_types,
            industry_clusters: options.industry_clusters,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

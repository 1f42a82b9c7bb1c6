#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chart builders for the flyttstat report pages.
//!
//! Each builder takes an optional area of interest, the report's
//! dimensional filters, and one chart configuration, runs the matching
//! aggregate query (or two, for net flow), and reshapes the rows into a
//! renderer-agnostic [`ChartModel`](flyttstat_chart_models::ChartModel).
//! The reshaping rules (top-N collapsing into "Övrigt", per-point percent
//! normalization, inflow-minus-outflow derivation) live in [`shape`] as
//! pure functions so they are testable without a database.

pub mod builders;
pub mod shape;
pub mod title;

use thiserror::Error;

/// Errors that can occur while building a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// An aggregate query failed.
    #[error("Database error: {0}")]
    Database(#[from] flyttstat_database::DbError),
}

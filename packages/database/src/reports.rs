//! CRUD queries for saved reports and their charts.
//!
//! Filters and chart configs are stored as `jsonb` and travel through the
//! driver as JSON text (`$n::jsonb` on the way in, `::text` on the way
//! out), so the typed representations live entirely on the Rust side.

use chrono::NaiveDateTime;
use flyttstat_chart_models::ChartConfig;
use flyttstat_database_models::{ChartRow, ReportRow};
use flyttstat_models::FilterPredicate;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

fn parse_filters(raw: &str) -> Result<Vec<FilterPredicate>, DbError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| DbError::Conversion {
        message: format!("Failed to parse report filters: {e}"),
    })
}

fn row_to_report(row: &switchy_database::Row) -> Result<ReportRow, DbError> {
    let filters_raw: String = row.to_value("filters").unwrap_or_default();
    let created_at: NaiveDateTime = row.to_value("created_at").unwrap_or_default();
    let updated_at: NaiveDateTime = row.to_value("updated_at").unwrap_or_default();

    Ok(ReportRow {
        id: row.to_value("id").unwrap_or_default(),
        user_id: row.to_value("user_id").unwrap_or_default(),
        title: row.to_value("title").unwrap_or_default(),
        location: row.to_value("location").unwrap_or(None),
        filters: parse_filters(&filters_raw)?,
        created_at,
        updated_at,
    })
}

fn row_to_chart(row: &switchy_database::Row) -> Result<ChartRow, DbError> {
    let config_raw: String = row.to_value("config").unwrap_or_default();
    let config: ChartConfig =
        serde_json::from_str(&config_raw).map_err(|e| DbError::Conversion {
            message: format!("Failed to parse chart config: {e}"),
        })?;

    Ok(ChartRow {
        id: row.to_value("id").unwrap_or_default(),
        report_id: row.to_value("report_id").unwrap_or_default(),
        config,
        created_at: row.to_value("created_at").unwrap_or_default(),
    })
}

/// Creates a new report for the given user.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn create_report(
    db: &dyn Database,
    user_id: &str,
    title: &str,
    location: Option<&str>,
    filters: &[FilterPredicate],
) -> Result<ReportRow, DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    let filters_json = serde_json::to_string(filters).map_err(|e| DbError::Conversion {
        message: format!("Failed to serialize filters: {e}"),
    })?;

    let rows = db
        .query_raw_params(
            "INSERT INTO reports (id, user_id, title, location, filters)
             VALUES ($1, $2, $3, $4, $5::jsonb)
             RETURNING id, user_id, title, location, filters::text as filters,
                       created_at, updated_at",
            &[
                DatabaseValue::String(id),
                DatabaseValue::String(user_id.to_string()),
                DatabaseValue::String(title.to_string()),
                location.map_or(DatabaseValue::Null, |l| DatabaseValue::String(l.to_string())),
                DatabaseValue::String(filters_json),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Insert returned no report row".to_string(),
    })?;

    row_to_report(row)
}

/// Lists a user's reports, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_reports(db: &dyn Database, user_id: &str) -> Result<Vec<ReportRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, user_id, title, location, filters::text as filters,
                    created_at, updated_at
             FROM reports
             WHERE user_id = $1
             ORDER BY created_at DESC",
            &[DatabaseValue::String(user_id.to_string())],
        )
        .await?;

    rows.iter().map(row_to_report).collect()
}

/// Fetches a single report by id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_report(db: &dyn Database, report_id: &str) -> Result<Option<ReportRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, user_id, title, location, filters::text as filters,
                    created_at, updated_at
             FROM reports
             WHERE id = $1",
            &[DatabaseValue::String(report_id.to_string())],
        )
        .await?;

    rows.first().map(row_to_report).transpose()
}

/// Deletes a report (charts cascade). Returns whether a row was deleted.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_report(db: &dyn Database, report_id: &str) -> Result<bool, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM reports WHERE id = $1",
            &[DatabaseValue::String(report_id.to_string())],
        )
        .await?;

    Ok(deleted > 0)
}

/// Attaches a chart configuration to a report.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn add_chart(
    db: &dyn Database,
    report_id: &str,
    config: &ChartConfig,
) -> Result<ChartRow, DbError> {
    let id = uuid::Uuid::new_v4().to_string();
    let config_json = serde_json::to_string(config).map_err(|e| DbError::Conversion {
        message: format!("Failed to serialize chart config: {e}"),
    })?;

    let rows = db
        .query_raw_params(
            "INSERT INTO charts (id, report_id, config)
             VALUES ($1, $2, $3::jsonb)
             RETURNING id, report_id, config::text as config, created_at",
            &[
                DatabaseValue::String(id),
                DatabaseValue::String(report_id.to_string()),
                DatabaseValue::String(config_json),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Insert returned no chart row".to_string(),
    })?;

    row_to_chart(row)
}

/// Lists a report's charts in creation order.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_charts(db: &dyn Database, report_id: &str) -> Result<Vec<ChartRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, report_id, config::text as config, created_at
             FROM charts
             WHERE report_id = $1
             ORDER BY created_at, id",
            &[DatabaseValue::String(report_id.to_string())],
        )
        .await?;

    rows.iter().map(row_to_chart).collect()
}

/// Deletes a single chart of a report. Returns whether a row was
/// deleted; a chart id belonging to a different report deletes nothing.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_chart(
    db: &dyn Database,
    report_id: &str,
    chart_id: &str,
) -> Result<bool, DbError> {
    let deleted = db
        .exec_raw_params(
            "DELETE FROM charts WHERE id = $1 AND report_id = $2",
            &[
                DatabaseValue::String(chart_id.to_string()),
                DatabaseValue::String(report_id.to_string()),
            ],
        )
        .await?;

    Ok(deleted > 0)
}

//! HTTP handler functions for the relocation statistics API.
//!
//! Every report endpoint is scoped to the caller: the `X-User-Id` header
//! identifies the owner, requests without it get a 401, and a report id
//! owned by someone else is indistinguishable from a missing one (404).

use actix_web::{HttpRequest, HttpResponse, web};
use flyttstat_chart_models::ChartConfig;
use flyttstat_charts::builders;
use flyttstat_database::{queries, reports};
use flyttstat_database_models::ReportRow;
use flyttstat_server_models::{
    AddChartRequest, ApiChart, ApiFilterOptions, ApiHealth, ApiReport, ApiReportChart,
    ApiReportView, CreateReportRequest, PreviewChartRequest,
};

use crate::AppState;

/// Header identifying the calling user.
const USER_ID_HEADER: &str = "X-User-Id";

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/filter-options`
///
/// Returns the distinct values of each filterable dimension present in
/// the dataset, for populating the filter UI.
pub async fn filter_options(state: web::Data<AppState>) -> HttpResponse {
    match queries::filter_options(state.db.as_ref()).await {
        Ok(options) => HttpResponse::Ok().json(ApiFilterOptions::from(options)),
        Err(e) => {
            log::error!("Failed to query filter options: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to query filter options"
            }))
        }
    }
}

/// `POST /api/charts/preview`
///
/// Builds a chart from a configuration without saving anything.
pub async fn preview_chart(
    state: web::Data<AppState>,
    body: web::Json<PreviewChartRequest>,
) -> HttpResponse {
    let area = body.location.as_deref().map(str::to_lowercase);
    let filters = builders::effective_filters(
        body.filters.as_deref().unwrap_or_default(),
        &body.config,
    );

    match builders::build_chart(state.db.as_ref(), area.as_deref(), &filters, &body.config).await {
        Ok(model) => HttpResponse::Ok().json(model),
        Err(e) => {
            log::error!("Failed to build chart preview: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to build chart"
            }))
        }
    }
}

/// `GET /api/reports`
///
/// Lists the calling user's reports, most recently created first.
pub async fn list_reports(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let Some(user_id) = current_user(&req) else {
        return unauthorized();
    };

    match reports::list_reports(state.db.as_ref(), &user_id).await {
        Ok(rows) => {
            let api_reports: Vec<ApiReport> = rows.into_iter().map(ApiReport::from).collect();
            HttpResponse::Ok().json(api_reports)
        }
        Err(e) => {
            log::error!("Failed to list reports: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list reports"
            }))
        }
    }
}

/// `POST /api/reports`
///
/// Creates a report for the calling user. The location, if given, is
/// stored lowercased so area matching stays case-insensitive.
pub async fn create_report(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateReportRequest>,
) -> HttpResponse {
    let Some(user_id) = current_user(&req) else {
        return unauthorized();
    };

    let location = body.location.as_deref().map(str::to_lowercase);
    let filters = body.filters.clone().unwrap_or_default();

    match reports::create_report(
        state.db.as_ref(),
        &user_id,
        &body.title,
        location.as_deref(),
        &filters,
    )
    .await
    {
        Ok(row) => HttpResponse::Created().json(ApiReport::from(row)),
        Err(e) => {
            log::error!("Failed to create report: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create report"
            }))
        }
    }
}

/// `GET /api/reports/{id}`
///
/// Returns a report with all of its charts built against the current
/// dataset, in saved order.
pub async fn get_report(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let Some(user_id) = current_user(&req) else {
        return unauthorized();
    };
    let report_id = path.into_inner();

    let report = match owned_report(&state, &user_id, &report_id).await {
        Ok(report) => report,
        Err(response) => return response,
    };

    let chart_rows = match reports::list_charts(state.db.as_ref(), &report.id).await {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to list charts for report {report_id}: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load report"
            }));
        }
    };

    let configs: Vec<(String, ChartConfig)> = chart_rows
        .iter()
        .map(|row| (row.id.clone(), row.config.clone()))
        .collect();

    let built = match builders::build_report_charts(
        state.db.as_ref(),
        report.location.as_deref(),
        &report.filters,
        &configs,
    )
    .await
    {
        Ok(built) => built,
        Err(e) => {
            log::error!("Failed to build charts for report {report_id}: {e}");
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to build report charts"
            }));
        }
    };

    let charts: Vec<ApiReportChart> = chart_rows
        .into_iter()
        .zip(built)
        .map(|(row, (_, model))| ApiReportChart {
            id: row.id,
            config: row.config,
            chart: model,
        })
        .collect();

    HttpResponse::Ok().json(ApiReportView {
        report: ApiReport::from(report),
        charts,
    })
}

/// `DELETE /api/reports/{id}`
///
/// Deletes a report and (via cascade) its charts.
pub async fn delete_report(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let Some(user_id) = current_user(&req) else {
        return unauthorized();
    };
    let report_id = path.into_inner();

    if let Err(response) = owned_report(&state, &user_id, &report_id).await {
        return response;
    }

    match reports::delete_report(state.db.as_ref(), &report_id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(),
        Err(e) => {
            log::error!("Failed to delete report {report_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete report"
            }))
        }
    }
}

/// `POST /api/reports/{id}/charts`
///
/// Adds a chart to a report. The configuration is validated by
/// deserialization before this handler runs.
pub async fn add_chart(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<AddChartRequest>,
) -> HttpResponse {
    let Some(user_id) = current_user(&req) else {
        return unauthorized();
    };
    let report_id = path.into_inner();

    if let Err(response) = owned_report(&state, &user_id, &report_id).await {
        return response;
    }

    match reports::add_chart(state.db.as_ref(), &report_id, &body.config).await {
        Ok(row) => HttpResponse::Created().json(ApiChart::from(row)),
        Err(e) => {
            log::error!("Failed to add chart to report {report_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to add chart"
            }))
        }
    }
}

/// `DELETE /api/reports/{id}/charts/{chart_id}`
///
/// Deletes a single chart from a report.
pub async fn delete_chart(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let Some(user_id) = current_user(&req) else {
        return unauthorized();
    };
    let (report_id, chart_id) = path.into_inner();

    if let Err(response) = owned_report(&state, &user_id, &report_id).await {
        return response;
    }

    match reports::delete_chart(state.db.as_ref(), &report_id, &chart_id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(),
        Err(e) => {
            log::error!("Failed to delete chart {chart_id}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete chart"
            }))
        }
    }
}

/// Extracts the calling user's id from the `X-User-Id` header.
fn current_user(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Loads a report and verifies the caller owns it. A report owned by a
/// different user yields the same 404 as a missing one.
async fn owned_report(
    state: &web::Data<AppState>,
    user_id: &str,
    report_id: &str,
) -> Result<ReportRow, HttpResponse> {
    match reports::get_report(state.db.as_ref(), report_id).await {
        Ok(Some(report)) if report.user_id == user_id => Ok(report),
        Ok(_) => Err(not_found()),
        Err(e) => {
            log::error!("Failed to load report {report_id}: {e}");
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load report"
            })))
        }
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": "Missing X-User-Id header"
    }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Report not found"
    }))
}

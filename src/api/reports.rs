//! Daily report API endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{DailyReport, ReportQuery},
};

/// List daily reports, newest date first
#[utoipa::path(
    get,
    path = "/reports",
    tag = "reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Daily reports list", body = Vec<DailyReport>)
    )
)]
pub async fn list_reports(
    State(state): State<crate::AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<DailyReport>>> {
    let reports = state.services.reports.list(&query).await?;
    Ok(Json(reports))
}

/// Fetch one report by its composite id
#[utoipa::path(
    get,
    path = "/reports/{id}",
    tag = "reports",
    params(("id" = String, Path, description = "Report id ({childId}-{date})")),
    responses(
        (status = 200, description = "Daily report", body = DailyReport),
        (status = 404, description = "Report not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_report(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DailyReport>> {
    let report = state
        .services
        .reports
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;
    Ok(Json(report))
}

/// Mark a report sent and visible, bypassing recomputation
#[utoipa::path(
    post,
    path = "/reports/{id}/send",
    tag = "reports",
    params(("id" = String, Path, description = "Report id ({childId}-{date})")),
    responses(
        (status = 200, description = "Report marked sent", body = DailyReport),
        (status = 404, description = "Report not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_sent(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DailyReport>> {
    let report = state.services.reports.mark_sent(&id).await?;
    Ok(Json(report))
}

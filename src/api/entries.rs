//! Entry ingestion API endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{BulkCreateRequest, BulkCreateResponse},
};

use super::StaffAuth;

/// Bulk-create entries, fanning each item out to its target children.
/// The response accounts for every input item: rejected items land in
/// `failed` with a reason code, everything else in `created`.
#[utoipa::path(
    post,
    path = "/entries/bulk",
    tag = "entries",
    request_body = BulkCreateRequest,
    responses(
        (status = 201, description = "Submission processed, possibly partially", body = BulkCreateResponse),
        (status = 400, description = "Missing staff context field", body = crate::error::ErrorResponse)
    )
)]
pub async fn bulk_create(
    State(state): State<crate::AppState>,
    StaffAuth(ctx): StaffAuth,
    Json(request): Json<BulkCreateRequest>,
) -> AppResult<(StatusCode, Json<BulkCreateResponse>)> {
    let response = state
        .services
        .entries
        .bulk_create(&ctx, &request.items)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{entries, health, reports};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sproutlog API",
        version = "1.0.0",
        description = "Child-care daily log and report REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Entries
        entries::bulk_create,
        // Reports
        reports::list_reports,
        reports::get_report,
        reports::mark_sent,
    ),
    components(
        schemas(
            // Entries
            crate::models::entry::Entry,
            crate::models::entry::EntryType,
            crate::models::entry::EntryCreateInput,
            crate::models::entry::BulkCreateRequest,
            crate::models::entry::BulkCreateResponse,
            crate::models::entry::CreatedEntry,
            crate::models::entry::FailedItem,
            crate::models::entry::RejectReason,
            // Reports
            crate::models::report::DailyReport,
            crate::models::report::ReportQuery,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "entries", description = "Bulk entry ingestion"),
        (name = "reports", description = "Daily report aggregation and delivery")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

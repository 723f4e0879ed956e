//! API handlers for Sproutlog REST endpoints

pub mod entries;
pub mod health;
pub mod openapi;
pub mod reports;

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{models::StaffContext, AppState};

/// Extractor for the already-validated staff context injected by the
/// gateway. Presence of the individual fields is enforced by the bulk
/// call itself, with machine-readable precondition codes.
pub struct StaffAuth(pub StaffContext);

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for StaffAuth {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(StaffAuth(StaffContext {
            user_doc_id: header_value(parts, "x-user-id"),
            daycare_id: header_value(parts, "x-daycare-id"),
            location_id: header_value(parts, "x-location-id"),
        }))
    }
}

//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "NGO Registry — Intervention Zones",
        version = "0.1.0",
        description = "Save and read the four-level intervention-zone hierarchy (country, region, department, municipality) of registered NGOs.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // NGO zones
        crate::routes::zones::create_zones,
        crate::routes::zones::replace_zones,
        crate::routes::zones::get_zones,
        crate::routes::zones::delete_zones,
        // Editing
        crate::routes::editing::toggle,
        crate::routes::editing::validate_zones,
    ),
    components(schemas(
        // Zone model
        ngoreg_core::ZoneType,
        ngoreg_core::ZoneNode,
        ngoreg_core::ZoneKey,
        ngoreg_core::PersistedZone,
        ngoreg_core::NgoId,
        ngoreg_core::ZoneId,
        ngoreg_core::DuplicateTuple,
        ngoreg_core::NameCollision,
        ngoreg_core::UnresolvedParent,
        ngoreg_zones::ToggleEvent,
        ngoreg_zones::ValidationReport,
        // Request/response types
        crate::routes::zones::ZoneListRequest,
        crate::routes::zones::ZoneRowsResponse,
        crate::routes::zones::ReplaceZonesResponse,
        crate::routes::zones::FlatZonesResponse,
        crate::routes::zones::DeleteZonesResponse,
        crate::routes::zones::ZoneView,
        crate::routes::editing::ToggleRequest,
        crate::routes::editing::ToggleResponse,
        crate::routes::editing::ValidateResponse,
        // Errors
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "zones", description = "Zones of one NGO"),
        (name = "editing", description = "Stateless helpers for the zone picker"),
    )
)]
pub struct ApiDoc;

/// Build the router serving `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

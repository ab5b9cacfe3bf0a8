//! # Zone Editing API
//!
//! Stateless helpers for the registration form: apply one checkbox toggle
//! to the current flat list, and check a list before saving it. Nothing
//! here touches the store.

use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use ngoreg_core::{zone_set_digest, ZoneNode};
use ngoreg_zones::{apply_toggle, is_selected, validate, ToggleEvent, ValidationReport};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::zones::{validate_zone_list, ZoneListRequest};
use crate::state::AppState;

/// The current list plus the toggle to apply to it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleRequest {
    #[serde(default)]
    pub zones: Vec<ZoneNode>,
    pub event: ToggleEvent,
}

impl Validate for ToggleRequest {
    fn validate(&self) -> Result<(), String> {
        validate_zone_list(&self.zones)?;
        if self.event.name().trim().is_empty() {
            return Err("event name must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleResponse {
    pub zones: Vec<ZoneNode>,
    /// Whether the toggled zone is selected after the toggle.
    pub selected: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    #[serde(flatten)]
    pub report: ValidationReport,
    /// Hex digest of the canonical zone set.
    pub digest: String,
}

/// Build the editing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/zones/toggle", post(toggle))
        .route("/v1/zones/validate", post(validate_zones))
}

/// POST /v1/zones/toggle — Apply one toggle with its cascade.
#[utoipa::path(
    post,
    path = "/v1/zones/toggle",
    request_body = ToggleRequest,
    responses(
        (status = 200, description = "Next zone list", body = ToggleResponse),
        (status = 400, description = "Malformed request", body = crate::error::ErrorBody),
    ),
    tag = "editing"
)]
pub(crate) async fn toggle(
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let zones = apply_toggle(&req.zones, &req.event);
    let selected = is_selected(&zones, &req.event);
    tracing::debug!(
        zone_type = %req.event.zone_type(),
        name = req.event.name(),
        selected,
        zones = zones.len(),
        "toggle applied"
    );
    Ok(Json(ToggleResponse { zones, selected }))
}

/// POST /v1/zones/validate — Check a list for duplicates and orphans.
#[utoipa::path(
    post,
    path = "/v1/zones/validate",
    request_body = ZoneListRequest,
    responses(
        (status = 200, description = "No duplicates; orphans listed as warnings", body = ValidateResponse),
        (status = 422, description = "Duplicate zones", body = crate::error::ErrorBody),
    ),
    tag = "editing"
)]
pub(crate) async fn validate_zones(
    body: Result<Json<ZoneListRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let report = validate(&req.zones)?;
    let digest = zone_set_digest(&req.zones).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ValidateResponse {
        report,
        digest: digest.to_hex(),
    }))
}

//! # NGO Zone API
//!
//! Saves, replaces, reads and clears the intervention zones of one NGO.
//! Create and update both run the three-pass resolver; update first
//! compares the submission with what is stored and skips every write when
//! they are canonically equal.
//!
//! Every write is bounded by `AppConfig::write_timeout`.

use std::future::Future;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use ngoreg_core::{NgoId, PersistedZone, UnresolvedParent, ZoneNode};
use ngoreg_store::{load_zones, rehydrate, resolve_and_persist, ReplaceOutcome, ZoneStore};

use crate::error::AppError;
use crate::extractors::{extract_path, extract_query, extract_validated_json, Validate};
use crate::state::AppState;

/// Longest accepted zone name, in bytes.
pub const MAX_NAME_LEN: usize = 255;
/// Most zones accepted in one submission.
pub const MAX_ZONES: usize = 5_000;

// ─── DTOs ────────────────────────────────────────────────────────────

/// A flat zone list as edited in the registration form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ZoneListRequest {
    pub zones: Vec<ZoneNode>,
}

impl Validate for ZoneListRequest {
    fn validate(&self) -> Result<(), String> {
        validate_zone_list(&self.zones)
    }
}

/// Shared by every endpoint that accepts a zone list.
pub(crate) fn validate_zone_list(zones: &[ZoneNode]) -> Result<(), String> {
    if zones.len() > MAX_ZONES {
        return Err(format!("zones must not exceed {MAX_ZONES} entries"));
    }
    for z in zones {
        if z.name.trim().is_empty() {
            return Err(format!("{} name must not be empty", z.zone_type));
        }
        if z.name.len() > MAX_NAME_LEN {
            return Err(format!(
                "{} name must not exceed {MAX_NAME_LEN} characters",
                z.zone_type
            ));
        }
        if let Some(p) = &z.parent_name {
            if p.len() > MAX_NAME_LEN {
                return Err(format!(
                    "parent_name must not exceed {MAX_NAME_LEN} characters"
                ));
            }
        }
    }
    Ok(())
}

/// Stored rows for one NGO.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ZoneRowsResponse {
    pub ngo_id: Uuid,
    pub zones: Vec<PersistedZone>,
    /// Orphans stored as roots (lenient mode only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<UnresolvedParent>,
}

/// Result of replacing an NGO's zones.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplaceZonesResponse {
    pub ngo_id: Uuid,
    /// `false` when the stored set already matched; nothing was written.
    pub changed: bool,
    /// Hex digest of the zone set, present when unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Rows deleted before the new list was stored.
    pub deleted: u64,
    pub zones: Vec<PersistedZone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<UnresolvedParent>,
}

/// The zones of one NGO rehydrated into the form's flat list.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlatZonesResponse {
    pub ngo_id: Uuid,
    pub zones: Vec<ZoneNode>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteZonesResponse {
    pub ngo_id: Uuid,
    pub deleted: u64,
}

/// Representation returned by `GET /v1/ngos/{ngo_id}/zones`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ZoneView {
    /// Stored rows with surrogate keys.
    #[default]
    Rows,
    /// The name-keyed list the form edits.
    Flat,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ZonesQuery {
    #[serde(default)]
    pub view: ZoneView,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ZonesView {
    Rows(ZoneRowsResponse),
    Flat(FlatZonesResponse),
}

// ─── Router ──────────────────────────────────────────────────────────

/// Build the NGO zones router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/ngos/{ngo_id}/zones",
        get(get_zones)
            .post(create_zones)
            .put(replace_zones)
            .delete(delete_zones),
    )
}

async fn with_timeout<T>(
    state: &AppState,
    what: &str,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    tokio::time::timeout(state.config.write_timeout, fut)
        .await
        .map_err(|_| {
            tracing::warn!(timeout = ?state.config.write_timeout, what, "zone write timed out");
            AppError::Timeout(format!("{what} exceeded {:?}", state.config.write_timeout))
        })?
}

// ─── Handlers ────────────────────────────────────────────────────────

/// POST /v1/ngos/{ngo_id}/zones — Save the zones of an NGO that has none.
#[utoipa::path(
    post,
    path = "/v1/ngos/{ngo_id}/zones",
    params(("ngo_id" = Uuid, Path, description = "NGO ID")),
    request_body = ZoneListRequest,
    responses(
        (status = 201, description = "Zones stored", body = ZoneRowsResponse),
        (status = 409, description = "NGO already has zones", body = crate::error::ErrorBody),
        (status = 422, description = "Duplicate or orphaned zones", body = crate::error::ErrorBody),
    ),
    tag = "zones"
)]
pub(crate) async fn create_zones(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ZoneListRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ZoneRowsResponse>), AppError> {
    let id = extract_path(path)?;
    let req = extract_validated_json(body)?;
    let ngo_id = NgoId::from(id);
    let mut store = state.store.clone();

    let outcome = with_timeout(&state, "zone create", async {
        if !store.load_for_ngo(&ngo_id).await?.is_empty() {
            return Err(AppError::Conflict(format!(
                "ngo {id} already has zones; use PUT to replace them"
            )));
        }
        let mode = state.config.resolution_mode;
        Ok::<_, AppError>(resolve_and_persist(&mut store, &ngo_id, &req.zones, mode).await?)
    })
    .await?;

    tracing::info!(ngo = %ngo_id, rows = outcome.zones.len(), "zones created");
    Ok((
        StatusCode::CREATED,
        Json(ZoneRowsResponse {
            ngo_id: id,
            zones: outcome.zones,
            warnings: outcome.warnings,
        }),
    ))
}

/// PUT /v1/ngos/{ngo_id}/zones — Replace the zones of an NGO.
#[utoipa::path(
    put,
    path = "/v1/ngos/{ngo_id}/zones",
    params(("ngo_id" = Uuid, Path, description = "NGO ID")),
    request_body = ZoneListRequest,
    responses(
        (status = 200, description = "Zones replaced or already current", body = ReplaceZonesResponse),
        (status = 422, description = "Duplicate or orphaned zones", body = crate::error::ErrorBody),
        (status = 504, description = "Write timed out", body = crate::error::ErrorBody),
    ),
    tag = "zones"
)]
pub(crate) async fn replace_zones(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ZoneListRequest>, JsonRejection>,
) -> Result<Json<ReplaceZonesResponse>, AppError> {
    let id = extract_path(path)?;
    let req = extract_validated_json(body)?;
    let ngo_id = NgoId::from(id);
    let mut store = state.store.clone();

    let response = with_timeout(&state, "zone update", async {
        let outcome = store
            .replace(&ngo_id, &req.zones, state.config.resolution_mode)
            .await?;
        Ok::<_, AppError>(match outcome {
            ReplaceOutcome::Unchanged { digest } => ReplaceZonesResponse {
                ngo_id: id,
                changed: false,
                digest: Some(digest.to_hex()),
                deleted: 0,
                zones: load_zones(&mut store, &ngo_id).await?,
                warnings: Vec::new(),
            },
            ReplaceOutcome::Replaced { deleted, outcome } => ReplaceZonesResponse {
                ngo_id: id,
                changed: true,
                digest: None,
                deleted,
                zones: outcome.zones,
                warnings: outcome.warnings,
            },
        })
    })
    .await?;

    Ok(Json(response))
}

/// GET /v1/ngos/{ngo_id}/zones — Read the zones of an NGO.
#[utoipa::path(
    get,
    path = "/v1/ngos/{ngo_id}/zones",
    params(("ngo_id" = Uuid, Path, description = "NGO ID"), ZonesQuery),
    responses(
        (status = 200, description = "Stored rows, or the flat list with view=flat", body = ZoneRowsResponse),
    ),
    tag = "zones"
)]
pub(crate) async fn get_zones(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ZonesQuery>, QueryRejection>,
) -> Result<Json<ZonesView>, AppError> {
    let id = extract_path(path)?;
    let query = extract_query(query)?;
    let ngo_id = NgoId::from(id);
    let mut store = state.store.clone();

    let rows = load_zones(&mut store, &ngo_id).await?;
    Ok(Json(match query.view {
        ZoneView::Rows => ZonesView::Rows(ZoneRowsResponse {
            ngo_id: id,
            zones: rows,
            warnings: Vec::new(),
        }),
        ZoneView::Flat => ZonesView::Flat(FlatZonesResponse {
            ngo_id: id,
            zones: rehydrate(&rows),
        }),
    }))
}

/// DELETE /v1/ngos/{ngo_id}/zones — Remove every zone of an NGO.
#[utoipa::path(
    delete,
    path = "/v1/ngos/{ngo_id}/zones",
    params(("ngo_id" = Uuid, Path, description = "NGO ID")),
    responses(
        (status = 200, description = "Zones deleted", body = DeleteZonesResponse),
    ),
    tag = "zones"
)]
pub(crate) async fn delete_zones(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteZonesResponse>, AppError> {
    let id = extract_path(path)?;
    let ngo_id = NgoId::from(id);
    let mut store = state.store.clone();

    let deleted = with_timeout(&state, "zone delete", async {
        Ok::<_, AppError>(store.delete_for_ngo(&ngo_id).await?)
    })
    .await?;

    tracing::info!(ngo = %ngo_id, deleted, "zones deleted");
    Ok(Json(DeleteZonesResponse {
        ngo_id: id,
        deleted,
    }))
}

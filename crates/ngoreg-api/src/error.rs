//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps resolver, store and validation errors to HTTP status codes with a
//! JSON body carrying an error code, message, and (for rejected zone lists)
//! the offending zones. Internal error details are never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use ngoreg_store::{ResolveError, StoreError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "DUPLICATE_ZONES").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Offending zones for a rejected list; absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// The zone list was rejected; `details` names the offending zones (422).
    #[error("{message}")]
    RejectedZones {
        code: &'static str,
        message: String,
        details: serde_json::Value,
    },

    /// Request body, path or query could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend is not ready to serve (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A zone write did not finish within the configured timeout (504).
    #[error("timed out: {0}")]
    Timeout(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::RejectedZones { code, .. } => (StatusCode::UNPROCESSABLE_ENTITY, *code),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let details = match self {
            Self::RejectedZones { details, .. } => Some(details),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Duplicate(e) => Self::RejectedZones {
                code: "DUPLICATE_ZONES",
                message: e.to_string(),
                details: serde_json::json!({
                    "duplicates": e.duplicates,
                    "collisions": e.collisions,
                }),
            },
            ResolveError::UnresolvedParents(warnings) => Self::RejectedZones {
                code: "UNRESOLVED_PARENTS",
                message: format!("{} zone(s) reference a missing parent", warnings.len()),
                details: serde_json::json!({ "unresolved": warnings }),
            },
            other @ (ResolveError::Batch(_) | ResolveError::Canonicalization(_)) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<ngoreg_core::DuplicateZoneError> for AppError {
    fn from(err: ngoreg_core::DuplicateZoneError) -> Self {
        ResolveError::Duplicate(err).into()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ngoreg_store::PersistenceBatchError> for AppError {
    fn from(err: ngoreg_store::PersistenceBatchError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngoreg_core::{DuplicateTuple, DuplicateZoneError, UnresolvedParent, ZoneNode, ZoneType};
    use ngoreg_store::{PersistenceBatchError, PersistencePass};

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (AppError::Timeout("x".into()), StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err}");
        }
    }

    #[test]
    fn error_body_omits_empty_details() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "TEST".to_string(),
                message: "test message".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("test message"));
        assert!(!json.contains("details"));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn duplicates_carry_details() {
        let dup = DuplicateZoneError {
            duplicates: vec![DuplicateTuple {
                key: ZoneNode::region("Dakar").key(),
                occurrences: 2,
            }],
            collisions: Vec::new(),
        };
        let (status, body) = response_parts(AppError::from(dup)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "DUPLICATE_ZONES");
        let details = body.error.details.unwrap();
        assert_eq!(details["duplicates"][0]["occurrences"], 2);
        assert_eq!(details["duplicates"][0]["key"]["name"], "Dakar");
    }

    #[tokio::test]
    async fn strict_orphans_are_unprocessable() {
        let orphan = UnresolvedParent {
            key: ZoneNode::department("Mbour", "Thiès").key(),
            expected_parent_type: ZoneType::Region,
            parent_name: Some("Thiès".into()),
        };
        let (status, body) =
            response_parts(ResolveError::UnresolvedParents(vec![orphan]).into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "UNRESOLVED_PARENTS");
        assert_eq!(body.error.details.unwrap()["unresolved"][0]["parent_name"], "Thiès");
    }

    #[tokio::test]
    async fn batch_failure_hides_details() {
        let err = PersistenceBatchError::new(
            PersistencePass::Departments,
            StoreError::Unavailable("connection reset by peer".into()),
        );
        let (status, body) = response_parts(ResolveError::Batch(err).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn timeout_is_504() {
        let (status, body) = response_parts(AppError::Timeout("zone write".into())).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(body.error.message.contains("zone write"));
    }
}

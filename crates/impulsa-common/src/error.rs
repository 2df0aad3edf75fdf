//! API error type shared by every crate that touches a request path.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Rate limit exceeded. Try again in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a failed write: unique violations surface as a 400 with the
    /// entity's own message, foreign key violations as a 400 naming the
    /// broken reference, anything else stays a database error.
    pub fn from_db_write(err: sqlx::Error, duplicate_message: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if let Some(mapped) = classify_pg_code(db.code().as_deref(), duplicate_message) {
                return mapped;
            }
        }
        ApiError::Database(err)
    }
}

fn classify_pg_code(code: Option<&str>, duplicate_message: &str) -> Option<ApiError> {
    match code {
        Some(UNIQUE_VIOLATION) => Some(ApiError::BadRequest(duplicate_message.to_string())),
        Some(FOREIGN_KEY_VIOLATION) => Some(ApiError::BadRequest(
            "Referenced record does not exist".to_string(),
        )),
        _ => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side failures get logged with their full chain; the client
        // only sees an opaque message.
        let message = match &self {
            ApiError::Database(err) => {
                tracing::error!(error = %err, "database failure");
                "Internal server error".to_string()
            }
            ApiError::Internal(err) => {
                tracing::error!(error = format!("{err:#}"), "internal failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = if matches!(self, ApiError::RateLimited { .. }) {
            let body = Json(json!({
                "error": "Too many requests",
                "message": message,
            }));
            (status, body).into_response()
        } else {
            (status, Json(json!({ "error": message }))).into_response()
        };

        if let ApiError::RateLimited { retry_after_secs } = &self {
            if let Ok(value) = retry_after_secs.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::RateLimited {
                retry_after_secs: 30
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unique_violation_maps_to_bad_request_with_message() {
        let err = classify_pg_code(Some("23505"), "CIF already exists");
        match err {
            Some(ApiError::BadRequest(msg)) => assert_eq!(msg, "CIF already exists"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn foreign_key_violation_maps_to_bad_request() {
        let err = classify_pg_code(Some("23503"), "unused");
        match err {
            Some(ApiError::BadRequest(msg)) => {
                assert!(msg.contains("does not exist"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn other_codes_stay_database_errors() {
        assert!(classify_pg_code(Some("40001"), "unused").is_none());
        assert!(classify_pg_code(None, "unused").is_none());
    }

    #[test]
    fn rate_limited_message_names_retry_window() {
        let err = ApiError::RateLimited {
            retry_after_secs: 42,
        };
        assert!(err.to_string().contains("42 seconds"));
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Service error taxonomy.
///
/// Every variant maps to one HTTP status and a structured `{"detail": ...}`
/// body. Store faults never reach this type directly: the store client
/// reduces them to sentinel values, and handlers translate those sentinels
/// into `StoreFailure` with a generic message so no Redis error text leaks
/// to callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Phone {phone} already exists")]
    Conflict {
        phone: String,
        existing_address: Option<String>,
    },

    #[error("{0}")]
    StoreFailure(String),

    #[error("Service unhealthy: {0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            // Conflict carries the currently stored address so the caller
            // can see what is already on record.
            ApiError::Conflict {
                existing_address, ..
            } => json!({
                "message": self.to_string(),
                "existing_address": existing_address,
            }),
            other => json!(other.to_string()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict {
                phone: "+79161234567".into(),
                existing_address: None
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::StoreFailure("write failed".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Unavailable("no redis".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_conflict_display_names_the_phone() {
        let err = ApiError::Conflict {
            phone: "+79161234567".into(),
            existing_address: Some("Main St 1".into()),
        };
        assert_eq!(err.to_string(), "Phone +79161234567 already exists");
    }
}

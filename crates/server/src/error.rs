//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use cadastro_core::{FieldError, ValidationMessageError};

use crate::db::RepositoryError;
use crate::services::ServiceError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationMessageError),

    /// Resource not found.
    #[error("Not found")]
    NotFound,

    /// A unique field is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// The body could not be read as JSON at all.
    #[error("Rejected body: {0}")]
    Rejected(JsonRejection),
}

/// Message for a field whose JSON value has the wrong type or format.
const INVALID_VALUE: &str = "Valor inválido";

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON whose fields don't fit the form
            JsonRejection::JsonDataError(err) => {
                let field = offending_field(&err).unwrap_or_else(|| "body".to_owned());
                Self::Validation(ValidationMessageError::new(vec![FieldError::new(
                    field,
                    INVALID_VALUE,
                )]))
            }
            other => Self::Rejected(other),
        }
    }
}

/// JSON path of the value serde failed on, e.g. `dataNascimento`.
fn offending_field(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(e) = e.downcast_ref::<serde_path_to_error::Error<serde_json::Error>>() {
            let path = e.path().to_string();
            return (path != ".").then_some(path);
        }
        source = e.source();
    }
    None
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(v) => Self::Validation(v),
            ServiceError::NotFound => Self::NotFound,
            ServiceError::Conflict(message) => Self::Conflict(message),
            ServiceError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::Validation(payload) => (StatusCode::BAD_REQUEST, Json(payload)).into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Conflict(message) => (StatusCode::CONFLICT, message).into_response(),
            Self::Rejected(rejection) => rejection.into_response(),
            // Don't expose internal error details to clients
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::extract::FromRequest;
    use http_body_util::BodyExt;

    async fn body_of(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Conflict("CPF já cadastrado".to_string());
        assert_eq!(err.to_string(), "Conflict: CPF já cadastrado");
        assert_eq!(AppError::NotFound.to_string(), "Not found");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Validation(ValidationMessageError::new(vec![]))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_service_error() {
        assert!(matches!(
            AppError::from(ServiceError::NotFound),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from(ServiceError::Conflict("x".to_string())),
            AppError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_validation_body_lists_field_errors() {
        let err = AppError::Validation(ValidationMessageError::new(vec![FieldError::new(
            "nome",
            "Nome é obrigatório",
        )]));
        let body: serde_json::Value = serde_json::from_slice(&body_of(err.into_response()).await).unwrap();

        assert_eq!(body["message"], ValidationMessageError::DEFAULT_MESSAGE);
        assert_eq!(body["errors"][0]["field"], "nome");
        assert_eq!(body["errors"][0]["message"], "Nome é obrigatório");
    }

    async fn reject(body: &'static str) -> JsonRejection {
        let request = axum::http::Request::builder()
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap();
        Json::<cadastro_core::ClienteForm>::from_request(request, &())
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_mistyped_field_is_a_validation_error() {
        let err = AppError::from(reject(r#"{"dataNascimento":"01/01/1985"}"#).await);
        let AppError::Validation(payload) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(
            payload.messages_for("dataNascimento").collect::<Vec<_>>(),
            ["Valor inválido"]
        );
    }

    #[tokio::test]
    async fn test_malformed_json_keeps_rejection() {
        let err = AppError::from(reject("{\"nome\":").await);
        assert!(matches!(err, AppError::Rejected(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_not_found_has_empty_body() {
        assert!(body_of(AppError::NotFound.into_response()).await.is_empty());
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let err = AppError::Database(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        let body = body_of(err.into_response()).await;
        assert_eq!(body, b"Internal server error");
    }
}

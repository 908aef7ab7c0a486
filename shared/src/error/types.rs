//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the primary error type crossing the HTTP boundary, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details (field-level errors, context)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a not authenticated error
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Create an invalid credentials error
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }
}

impl From<validator::ValidationErrors> for AppError {
    /// Flatten field errors into one message, keeping each field's messages
    /// under `details`.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        let mut details = HashMap::new();

        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        for (field, errs) in fields {
            let field_messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                })
                .collect();
            messages.extend(field_messages.iter().cloned());
            details.insert(field.to_string(), Value::from(field_messages));
        }

        // Nested list errors (e.g. one bad order line) are reported by index
        for (field, kind) in errors.errors() {
            if let validator::ValidationErrorsKind::List(entries) = kind {
                for (index, nested) in entries {
                    let inner = AppError::from((**nested).clone());
                    messages.push(inner.message.clone());
                    details.insert(
                        format!("{field}[{index}]"),
                        Value::from(inner.message),
                    );
                }
            }
        }

        let message = if messages.is_empty() {
            ErrorCode::ValidationFailed.message().to_string()
        } else {
            messages.join("; ")
        };

        Self {
            code: ErrorCode::ValidationFailed,
            message,
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
        }
    }
}

/// Error body returned to clients
///
/// - `code`: numeric [`ErrorCode`]
/// - `message`: human-readable message
/// - `details`: field-level errors or context, when present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ErrorResponse::from(&self);

        // Log system errors
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    /// Malformed or mistyped request bodies
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, "Invalid request body")
            .with_detail("reason", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::OrderNotFound);
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.message, "Order not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "email")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "email");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_app_error_convenience_constructors() {
        let err = AppError::not_found("User");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "User not found");
        assert!(err.details.as_ref().unwrap().contains_key("resource"));

        assert_eq!(AppError::unauthorized().http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::token_expired().code, ErrorCode::TokenExpired);
        assert_eq!(AppError::conflict("dup").http_status(), StatusCode::CONFLICT);
    }

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "Please provide a valid email address"))]
        email: String,
        #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
        password: String,
    }

    #[test]
    fn test_from_validation_errors() {
        let input = Signup {
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        };
        let err: AppError = input.validate().unwrap_err().into();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(
            err.message,
            "Please provide a valid email address; Password must be at least 6 characters long"
        );
        let details = err.details.unwrap();
        assert!(details.contains_key("email"));
        assert!(details.contains_key("password"));
    }

    #[test]
    fn test_error_response_body() {
        let err = AppError::with_message(ErrorCode::OrderNotFound, "Order not found")
            .with_detail("id", "abc");
        let value = serde_json::to_value(ErrorResponse::from(&err)).unwrap();

        assert_eq!(value["code"], 4001);
        assert_eq!(value["message"], "Order not found");
        assert_eq!(value["details"]["id"], "abc");

        let bare = serde_json::to_value(ErrorResponse::from(&AppError::unauthorized())).unwrap();
        assert!(bare.get("details").is_none());
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

/// Errors raised while handling a request.
///
/// Every response built from an `AppError` keeps a copy of the error in its
/// extensions, so outer middleware can react to the condition that was raised
/// rather than to the rendered status code.
#[derive(Debug, Clone)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
    /// The user's stored access token is no longer valid.
    ExpiredToken,
    /// Login was rejected by the group membership check. `args` holds the
    /// positional arguments the backend raised with; the first one is
    /// normally a JSON object describing the failure.
    AuthForbidden { args: Vec<Value> },
}

impl AppError {
    pub fn auth_forbidden(payload: Value) -> Self {
        AppError::AuthForbidden {
            args: vec![payload],
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::ExpiredToken => write!(f, "Expired Token: access token has expired"),
            AppError::AuthForbidden { .. } => {
                write!(f, "Auth Forbidden: no linked identity is in an allowed group")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "Access token expired".to_string(),
            ),
            AppError::AuthForbidden { .. } => (
                StatusCode::FORBIDDEN,
                "Your identity is not a member of an allowed group".to_string(),
            ),
        };

        let body = json!({ "error": message });
        let mut response = (status, axum::Json(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

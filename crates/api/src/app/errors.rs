use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{json, Value};

use stockpile_core::DomainError;
use stockpile_infra::ManagerError;

pub fn manager_error_to_response(err: ManagerError) -> axum::response::Response {
    match err {
        ManagerError::Domain(e) => domain_error_to_response(e),
        ManagerError::Storage { action, source } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to {action}"),
            Some(Value::String(source.to_string())),
        ),
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation { message, details } => {
            let details = if details.is_empty() {
                None
            } else {
                serde_json::to_value(&details).ok()
            };
            json_error(StatusCode::BAD_REQUEST, message, details)
        }
        DomainError::Duplicate(_) => json_error(
            StatusCode::BAD_REQUEST,
            "A good with this name already exists",
            None,
        ),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "Good not found", None),
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::BAD_REQUEST, "Not enough stock available", None)
        }
        DomainError::NoFields => json_error(StatusCode::BAD_REQUEST, "No valid fields to update", None),
    }
}

/// Error body: `{"error": <message>, "details"?: <value>}`.
pub fn json_error(
    status: StatusCode,
    error: impl Into<String>,
    details: Option<Value>,
) -> axum::response::Response {
    let mut body = json!({ "error": error.into() });
    if let Some(details) = details {
        body["details"] = details;
    }
    (status, axum::Json(body)).into_response()
}

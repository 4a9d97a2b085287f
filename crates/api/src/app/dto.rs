use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::Value;

use stockpile_infra::Deduction;
use stockpile_inventory::{Good, GoodPatch};

use crate::app::errors;

// -------------------------
// Request bodies
// -------------------------

/// Decode a raw request body as JSON.
///
/// Bodies are kept as untyped documents: field types are part of what the
/// inventory rules validate. An empty body decodes to `null`.
pub fn parse_json_body(body: &Bytes) -> Result<Value, axum::response::Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "Invalid JSON body",
            Some(Value::String(e.to_string())),
        )
    })
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn good_to_json(good: &Good) -> Value {
    serde_json::json!({
        "name": good.name,
        "category": good.category,
        "price_per_item": good.price_per_item,
        "description": good.description,
        "stock_count": good.stock_count,
    })
}

pub fn deduction_to_json(d: &Deduction) -> Value {
    serde_json::json!({
        "message": format!("{} item(s) deducted from '{}' stock", d.quantity, d.name),
    })
}

pub fn update_to_json(applied: &GoodPatch) -> Value {
    serde_json::json!({
        "message": "Good updated successfully",
        "updated_fields": applied,
    })
}

use axum::http::StatusCode;

pub async fn greeting() -> &'static str {
    "Inventory service is running"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

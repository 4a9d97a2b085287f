use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_goods))
        // `/add` outranks `/:name`, so reads of a good named "add" land here.
        .route("/add", post(add_good).get(get_good_named_add))
        .route("/deduct/:name", patch(deduct_good))
        .route("/update/:name", patch(update_good))
        .route("/:name", get(get_good))
}

pub async fn add_good(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let body = match dto::parse_json_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.manager().create(&body).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "message": "Good added successfully" })),
        )
            .into_response(),
        Err(e) => errors::manager_error_to_response(e),
    }
}

pub async fn deduct_good(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let body = match dto::parse_json_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.manager().deduct(&name, &body).await {
        Ok(d) => (StatusCode::OK, Json(dto::deduction_to_json(&d))).into_response(),
        Err(e) => errors::manager_error_to_response(e),
    }
}

pub async fn update_good(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let body = match dto::parse_json_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.manager().update(&name, &body).await {
        Ok(applied) => (StatusCode::OK, Json(dto::update_to_json(&applied))).into_response(),
        Err(e) => errors::manager_error_to_response(e),
    }
}

pub async fn get_good(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    fetch_good(&services, &name).await
}

pub async fn get_good_named_add(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    fetch_good(&services, "add").await
}

async fn fetch_good(services: &AppServices, name: &str) -> axum::response::Response {
    match services.manager().get(name).await {
        Ok(good) => (StatusCode::OK, Json(dto::good_to_json(&good))).into_response(),
        Err(e) => errors::manager_error_to_response(e),
    }
}

pub async fn list_goods(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.manager().list().await {
        Ok(goods) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": goods.len(),
                "goods": goods.iter().map(dto::good_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::manager_error_to_response(e),
    }
}

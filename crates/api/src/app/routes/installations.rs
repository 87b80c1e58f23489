use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_installations))
        .route("/:id", get(get_installation))
        .route("/:id/status", post(change_status))
}

pub async fn list_installations(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListInstallationsQuery>,
) -> axum::response::Response {
    let status = match dto::parse_status_filter(query.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.list(status) {
        Ok(all) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": all.len(),
                "installations": all,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_installation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_installation_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get(id) {
        Ok(installation) => (StatusCode::OK, Json(installation)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::StatusChangeRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_installation_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                rejection.body_text(),
            );
        }
    };

    match services.change_status(id, body.expected_version(), &body.change, Utc::now()) {
        Ok(installation) => (StatusCode::OK, Json(installation)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

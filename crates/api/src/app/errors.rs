use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pvtrack_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::NotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("installation {id} not found"),
        ),
        ServiceError::Concurrency(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::Rejected(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "validation_error",
                "kind": e.kind(),
                "message": e.to_string(),
            })),
        )
            .into_response(),
        ServiceError::Store(e) => {
            tracing::error!("store failure: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

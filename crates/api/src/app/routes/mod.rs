use axum::Router;

pub mod installations;
pub mod system;

/// Router for all domain endpoints.
pub fn router() -> Router {
    Router::new().nest("/installations", installations::router())
}

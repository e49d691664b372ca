use axum::{routing::get, Router};

use crate::api::rest::nodes::router as nodes_router;

pub mod health;
pub mod nodes;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health::healthcheck))
        .merge(nodes_router())
}

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::{
    domain::models::{NeighborRecord, NodeSummary},
    infrastructure::{auth::ApiToken, state::AppState},
    services::{
        errors::ServiceError,
        nodes::{CreateNodeRequest, NodeService},
    },
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<serde_json::Value>)>;

pub fn router() -> Router {
    Router::new()
        .route("/nodes", get(list_nodes).post(create_node))
        .route("/nodes/:id", get(get_node).delete(delete_node))
}

async fn list_nodes(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Vec<NodeSummary>> {
    let service = NodeService::new(state);
    let nodes = service.list_nodes().await.map_err(to_response)?;
    Ok(Json(nodes))
}

async fn get_node(
    Extension(state): Extension<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<NeighborRecord>> {
    let Path(id) = id.map_err(path_error)?;
    let service = NodeService::new(state);
    let records = service.get_node(id).await.map_err(to_response)?;
    Ok(Json(records))
}

// `ApiToken` precedes the body extractor so unauthenticated requests are
// rejected before the payload is parsed.
async fn create_node(
    Extension(state): Extension<Arc<AppState>>,
    _token: ApiToken,
    payload: Result<Json<CreateNodeRequest>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    let Json(payload) = payload
        .map_err(|rejection| to_response(ServiceError::Validation(rejection.body_text())))?;
    let service = NodeService::new(state);
    service.create_node(payload).await.map_err(to_response)?;
    Ok(Json(
        serde_json::json!({ "message": "Node and relationships added successfully" }),
    ))
}

async fn delete_node(
    Extension(state): Extension<Arc<AppState>>,
    _token: ApiToken,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<serde_json::Value> {
    let Path(id) = id.map_err(path_error)?;
    let service = NodeService::new(state);
    service.delete_node(id).await.map_err(to_response)?;
    Ok(Json(
        serde_json::json!({ "message": "Node and relationships deleted successfully" }),
    ))
}

fn path_error(rejection: PathRejection) -> (StatusCode, Json<serde_json::Value>) {
    to_response(ServiceError::Validation(rejection.body_text()))
}

fn to_response(err: ServiceError) -> (StatusCode, Json<serde_json::Value>) {
    (
        err.status_code(),
        Json(serde_json::json!({ "detail": err.detail() })),
    )
}

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Extension, Router,
};
use graph_api::{
    api,
    domain::models::{CreateOutcome, NeighborRecord, NewRelationship, NodeSummary, PropertyMap},
    infrastructure::{
        config::{AppConfig, AuthConfig, Config, DatabaseConfig},
        graph::{GraphError, GraphStore, MemoryGraph},
        state::AppState,
    },
};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "integration-secret";

fn app() -> Router {
    app_with(Arc::new(MemoryGraph::default()))
}

fn app_with(graph: Arc<dyn GraphStore>) -> Router {
    let config = Arc::new(Config {
        app: AppConfig::default(),
        database: DatabaseConfig {
            provider: "memory".to_string(),
            ..DatabaseConfig::default()
        },
        auth: AuthConfig {
            api_token: TOKEN.to_string(),
        },
    });
    let state = Arc::new(AppState::new(Arc::clone(&config), graph));
    api::build_router(config).layer(Extension(state))
}

/// Store whose every call fails the way an unreachable database does.
struct UnreachableGraph;

fn connection_error() -> GraphError {
    GraphError::Connection("bolt://user:pw@host".to_string())
}

#[async_trait::async_trait]
impl GraphStore for UnreachableGraph {
    async fn list_nodes(&self) -> Result<Vec<NodeSummary>, GraphError> {
        Err(connection_error())
    }

    async fn node_with_neighbors(
        &self,
        _id: i64,
    ) -> Result<Option<Vec<NeighborRecord>>, GraphError> {
        Err(connection_error())
    }

    async fn create_node_with_relationships(
        &self,
        _label: &str,
        _properties: &PropertyMap,
        _relationships: &[NewRelationship],
    ) -> Result<CreateOutcome, GraphError> {
        Err(connection_error())
    }

    async fn delete_node(&self, _id: i64) -> Result<(), GraphError> {
        Err(connection_error())
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

async fn create(app: &Router, body: Value) -> Result<(StatusCode, Value)> {
    send(app, "POST", "/nodes", Some(TOKEN), Some(body)).await
}

#[tokio::test]
async fn list_nodes_returns_id_and_label_only() -> Result<()> {
    let app = app();

    let (status, body) = send(&app, "GET", "/nodes", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    create(&app, json!({"label": "Root", "properties": {"id": 1, "name": "root"}, "relationships": []})).await?;

    let (status, body) = send(&app, "GET", "/nodes", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 1, "label": "Root"}]));
    Ok(())
}

#[tokio::test]
async fn mutating_routes_require_the_configured_token() -> Result<()> {
    let app = app();
    let (status, _) = create(
        &app,
        json!({"label": "TestNode", "properties": {"id": 2}, "relationships": []}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let payload = json!({"label": "Intruder", "properties": {"id": 3}, "relationships": []});
    for token in [None, Some(""), Some("INVALID_TOKEN"), Some("integration-secret ")] {
        let (status, body) = send(&app, "POST", "/nodes", token, Some(payload.clone())).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "token {token:?}");
        assert!(body.get("detail").is_some());

        let (status, _) = send(&app, "DELETE", "/nodes/2", token, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "token {token:?}");
    }

    let (_, body) = send(&app, "GET", "/nodes", None, None).await?;
    assert_eq!(body, json!([{"id": 2, "label": "TestNode"}]));
    Ok(())
}

#[tokio::test]
async fn unauthorized_request_is_rejected_before_body_parsing() -> Result<()> {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/nodes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn created_relationship_is_visible_on_the_new_node() -> Result<()> {
    let app = app();
    create(&app, json!({"label": "Root", "properties": {"id": 1}, "relationships": []})).await?;

    let (status, body) = create(
        &app,
        json!({
            "label": "TestNode",
            "properties": {"id": 2, "name": "New Test Node"},
            "relationships": [{"target_id": 1, "attributes": {"type": "linked"}}],
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Node and relationships added successfully"}));

    let (status, body) = send(&app, "GET", "/nodes/2", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().expect("expected a list of records");
    assert!(records
        .iter()
        .any(|record| record["relationship"]["attributes"] == json!({"type": "linked"})));

    let record = &records[0];
    assert_eq!(record["relationship"]["type"], "RELATIONSHIP_TYPE");
    assert_eq!(record["node"]["label"], json!(["TestNode"]));
    assert_eq!(record["node"]["attributes"]["name"], "New Test Node");
    assert_eq!(record["target_node"]["attributes"]["id"], 1);
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent_and_subsequent_get_is_not_found() -> Result<()> {
    let app = app();
    create(&app, json!({"label": "Root", "properties": {"id": 1}, "relationships": []})).await?;
    create(
        &app,
        json!({"label": "TestNode", "properties": {"id": 2}, "relationships": [{"target_id": 1, "attributes": {}}]}),
    )
    .await?;

    let (status, body) = send(&app, "DELETE", "/nodes/2", Some(TOKEN), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Node and relationships deleted successfully"}));

    let (status, body) = send(&app, "GET", "/nodes/2", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Node not found"}));

    let (status, _) = send(&app, "DELETE", "/nodes/2", Some(TOKEN), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/nodes/1", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn missing_target_keeps_node_without_relationship() -> Result<()> {
    let app = app();

    let (status, _) = create(
        &app,
        json!({
            "label": "Dangling",
            "properties": {"id": 10},
            "relationships": [{"target_id": 999, "attributes": {"type": "ghost"}}],
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, nodes) = send(&app, "GET", "/nodes", None, None).await?;
    assert_eq!(nodes, json!([{"id": 10, "label": "Dangling"}]));

    let (status, records) = send(&app, "GET", "/nodes/10", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records, json!([]));
    Ok(())
}

#[tokio::test]
async fn concurrent_creations_do_not_interfere() -> Result<()> {
    let app = app();

    let (first, second) = tokio::join!(
        create(&app, json!({"label": "Alpha", "properties": {"id": 21, "name": "alpha"}})),
        create(&app, json!({"label": "Beta", "properties": {"id": 22, "name": "beta"}})),
    );
    assert_eq!(first?.0, StatusCode::OK);
    assert_eq!(second?.0, StatusCode::OK);

    let (_, nodes) = send(&app, "GET", "/nodes", None, None).await?;
    let nodes = nodes.as_array().cloned().unwrap_or_default();
    assert_eq!(nodes.len(), 2);
    assert!(nodes.contains(&json!({"id": 21, "label": "Alpha"})));
    assert!(nodes.contains(&json!({"id": 22, "label": "Beta"})));
    Ok(())
}

#[tokio::test]
async fn many_parallel_creations_all_land() -> Result<()> {
    let app = app();

    let requests = (100..120).map(|id| {
        let app = app.clone();
        async move {
            create(
                &app,
                json!({"label": format!("Batch{id}"), "properties": {"id": id}}),
            )
            .await
        }
    });
    for result in futures::future::join_all(requests).await {
        assert_eq!(result?.0, StatusCode::OK);
    }

    let (_, nodes) = send(&app, "GET", "/nodes", None, None).await?;
    assert_eq!(nodes.as_array().map(Vec::len), Some(20));
    Ok(())
}

#[tokio::test]
async fn invalid_input_is_unprocessable() -> Result<()> {
    let app = app();

    let (status, body) = create(
        &app,
        json!({"label": "Bad) DETACH DELETE (x", "properties": {"id": 1}}),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("label")));

    let (status, _) = create(&app, json!({"properties": {"id": 1}})).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, "GET", "/nodes/abc", None, None).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.get("detail").is_some());

    let (_, nodes) = send(&app, "GET", "/nodes", None, None).await?;
    assert_eq!(nodes, json!([]));
    Ok(())
}

#[tokio::test]
async fn unknown_routes_and_health() -> Result<()> {
    let app = app();

    let (status, body) = send(&app, "GET", "/does-not-exist", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Not Found"}));

    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn database_failures_return_generic_server_error() -> Result<()> {
    let app = app_with(Arc::new(UnreachableGraph));
    let expected = json!({"detail": "Internal server error"});

    let responses = [
        send(&app, "GET", "/nodes", None, None).await?,
        send(&app, "GET", "/nodes/1", None, None).await?,
        send(
            &app,
            "POST",
            "/nodes",
            Some(TOKEN),
            Some(json!({"label": "TestNode", "properties": {"id": 1}})),
        )
        .await?,
        send(&app, "DELETE", "/nodes/1", Some(TOKEN), None).await?,
    ];

    for (status, body) in responses {
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, expected);
        assert!(!body.to_string().contains("pw"));
        assert!(!body.to_string().contains("bolt://"));
    }
    Ok(())
}

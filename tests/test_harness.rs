use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use graph_api::infrastructure::{
    config::DatabaseConfig,
    graph::{GraphStore, Neo4jGraph},
};

/// Runs `test` against a live Neo4j, or skips when none is reachable.
pub async fn run_test<F, Fut>(test: F) -> Result<()>
where
    F: FnOnce(Arc<dyn GraphStore>) -> Fut,
    Fut: Future<Output = Result<()>> + Send,
{
    dotenvy::dotenv().ok();
    let config = DatabaseConfig {
        uri: env_or("DB_URI", "bolt://localhost:7687"),
        username: env_or("DB_USERNAME", "neo4j"),
        password: env_or("DB_PASSWORD", "password"),
        ..DatabaseConfig::default()
    };

    let graph = match Neo4jGraph::connect(&config).await {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("Skipping integration test: unable to connect to neo4j: {err}");
            return Ok(());
        }
    };

    // Connections are opened lazily; probe once before running the scenario.
    if let Err(err) = graph.delete_node(i64::MIN).await {
        eprintln!("Skipping integration test: neo4j not answering: {err}");
        return Ok(());
    }

    test(Arc::new(graph)).await
}

/// An id unlikely to collide with data already in the database.
pub fn unique_id() -> i64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    (nanos % 1_000_000_000_000) as i64 + 1_000_000_000_000
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

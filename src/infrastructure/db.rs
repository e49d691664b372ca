use std::sync::Arc;

use anyhow::Context;

use super::config::DatabaseConfig;
use super::graph::{GraphStore, MemoryGraph, Neo4jGraph};

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn GraphStore>> {
    match config.provider.as_str() {
        "neo4j" => {
            let graph = Neo4jGraph::connect(config)
                .await
                .with_context(|| "failed to connect to Neo4j")?;
            Ok(Arc::new(graph))
        }
        "memory" => Ok(Arc::new(MemoryGraph::default())),
        other => anyhow::bail!("unsupported graph provider: {other}"),
    }
}

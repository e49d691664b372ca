//! Graph access behind one trait so the HTTP layer never sees the driver.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{
    CreateOutcome, NeighborRecord, NewRelationship, NodeSummary, PropertyMap,
};

mod convert;
mod memory;
mod neo4j;

pub use memory::MemoryGraph;
pub use neo4j::Neo4jGraph;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("neo4j connection error: {0}")]
    Connection(String),
    #[error("neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("unsupported property value: {0}")]
    UnsupportedValue(String),
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Every node's `id` property and first label.
    async fn list_nodes(&self) -> Result<Vec<NodeSummary>, GraphError>;

    /// `None` when no node carries `id`; an empty list when it exists but has
    /// no relationships.
    async fn node_with_neighbors(&self, id: i64)
        -> Result<Option<Vec<NeighborRecord>>, GraphError>;

    /// Creates the node and one edge per matched target in a single
    /// transaction. `label` must already satisfy `validation::rules::validate_label`.
    async fn create_node_with_relationships(
        &self,
        label: &str,
        properties: &PropertyMap,
        relationships: &[NewRelationship],
    ) -> Result<CreateOutcome, GraphError>;

    /// Detach-deletes every node carrying `id`. Missing ids are not an error.
    async fn delete_node(&self, id: i64) -> Result<(), GraphError>;
}

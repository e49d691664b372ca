use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query, Row, Txn};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::models::{
    CreateOutcome, NeighborRecord, NewRelationship, NodeSummary, PropertyMap, RELATIONSHIP_TYPE,
};
use crate::infrastructure::config::DatabaseConfig;

use super::convert::{json_to_bolt, map_to_bolt, node_to_view, relation_to_view};
use super::{GraphError, GraphStore};

/// Neo4j-backed store. Clone is cheap; the driver keeps a connection pool and
/// every call below holds one connection only while it runs.
#[derive(Clone)]
pub struct Neo4jGraph {
    graph: Graph,
}

impl Neo4jGraph {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.username)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        info!(uri = %config.uri, "connected to neo4j");
        Ok(Self { graph })
    }

    async fn query_rows(&self, q: Query) -> Result<Vec<Row>, GraphError> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraph {
    async fn list_nodes(&self) -> Result<Vec<NodeSummary>, GraphError> {
        let rows = self
            .query_rows(query("MATCH (n) RETURN n.id AS id, labels(n) AS labels"))
            .await?;

        rows.iter()
            .map(|row| {
                let id: Value = row
                    .get("id")
                    .map_err(|e| GraphError::Serialization(format!("failed to read id: {e}")))?;
                let labels: Vec<String> = row.get("labels").map_err(|e| {
                    GraphError::Serialization(format!("failed to read labels: {e}"))
                })?;
                Ok(NodeSummary {
                    id,
                    label: labels.into_iter().next().unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn node_with_neighbors(
        &self,
        id: i64,
    ) -> Result<Option<Vec<NeighborRecord>>, GraphError> {
        let q = query(
            "MATCH (n) WHERE n.id = $id
             OPTIONAL MATCH (n)-[r]-(m)
             RETURN n AS node, elementId(n) AS node_id,
                    r AS relationship, r IS NULL AS isolated,
                    m AS target_node, elementId(m) AS target_id",
        )
        .param("id", id);

        let rows = self.query_rows(q).await?;
        if rows.is_empty() {
            return Ok(None);
        }

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let isolated: bool = row.get("isolated").map_err(|e| {
                GraphError::Serialization(format!("failed to read isolated flag: {e}"))
            })?;
            if isolated {
                continue;
            }
            let node: neo4rs::Node = row
                .get("node")
                .map_err(|e| GraphError::Serialization(format!("failed to get node: {e}")))?;
            let rel: neo4rs::Relation = row
                .get("relationship")
                .map_err(|e| GraphError::Serialization(format!("failed to get relation: {e}")))?;
            let target: neo4rs::Node = row.get("target_node").map_err(|e| {
                GraphError::Serialization(format!("failed to get target node: {e}"))
            })?;

            let node_id: String = row
                .get("node_id")
                .map_err(|e| GraphError::Serialization(format!("failed to read node id: {e}")))?;
            let target_id: String = row.get("target_id").map_err(|e| {
                GraphError::Serialization(format!("failed to read target id: {e}"))
            })?;

            records.push(NeighborRecord {
                node: node_to_view(&node, node_id)?,
                relationship: relation_to_view(&rel)?,
                target_node: node_to_view(&target, target_id)?,
            });
        }

        Ok(Some(records))
    }

    async fn create_node_with_relationships(
        &self,
        label: &str,
        properties: &PropertyMap,
        relationships: &[NewRelationship],
    ) -> Result<CreateOutcome, GraphError> {
        let mut txn = self.graph.start_txn().await?;

        match write_node_and_edges(&mut txn, label, properties, relationships).await {
            Ok(outcome) => {
                txn.commit().await?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = ?rollback_err, "failed to roll back node creation");
                }
                Err(err)
            }
        }
    }

    async fn delete_node(&self, id: i64) -> Result<(), GraphError> {
        let mut txn = self.graph.start_txn().await?;
        let q = query("MATCH (n) WHERE n.id = $id DETACH DELETE n").param("id", id);

        let deleted = txn.run(q).await;
        if let Err(err) = deleted {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = ?rollback_err, "failed to roll back node deletion");
            }
            return Err(err.into());
        }

        txn.commit().await?;
        debug!(id, "node detach-deleted");
        Ok(())
    }
}

async fn write_node_and_edges(
    txn: &mut Txn,
    label: &str,
    properties: &PropertyMap,
    relationships: &[NewRelationship],
) -> Result<CreateOutcome, GraphError> {
    // `label` has passed validate_label; backticks keep it a single identifier.
    let create = query(&format!(
        "CREATE (n:`{label}` $properties) RETURN elementId(n) AS element_id"
    ))
    .param("properties", map_to_bolt(properties)?);

    let row = last_row(txn, create)
        .await?
        .ok_or_else(|| GraphError::Serialization("node creation returned no row".into()))?;
    let element_id: String = row
        .get("element_id")
        .map_err(|e| GraphError::Serialization(format!("failed to read element id: {e}")))?;

    let mut outcome = CreateOutcome {
        element_id,
        ..CreateOutcome::default()
    };

    for relationship in relationships {
        let link = query(&format!(
            "MATCH (n) WHERE elementId(n) = $node_id
             MATCH (m) WHERE m.id = $target_id
             CREATE (n)-[r:{RELATIONSHIP_TYPE}]->(m)
             SET r = $attributes
             RETURN count(r) AS created"
        ))
        .param("node_id", outcome.element_id.clone())
        .param("target_id", json_to_bolt(&relationship.target_id)?)
        .param("attributes", map_to_bolt(&relationship.attributes)?);

        let created = match last_row(txn, link).await? {
            Some(row) => row.get::<i64>("created").map_err(|e| {
                GraphError::Serialization(format!("failed to read edge count: {e}"))
            })?,
            None => 0,
        };

        if created > 0 {
            outcome.relationships_created += created as usize;
        } else {
            outcome.relationships_skipped += 1;
            warn!(
                target_id = %relationship.target_id,
                "relationship target not found; edge skipped"
            );
        }
    }

    Ok(outcome)
}

/// Runs `q` inside the transaction and drains the stream, keeping the last row.
async fn last_row(txn: &mut Txn, q: Query) -> Result<Option<Row>, GraphError> {
    let mut stream = txn.execute(q).await?;
    let mut last = None;
    while let Some(row) = stream.next(txn.handle()).await? {
        last = Some(row);
    }
    Ok(last)
}

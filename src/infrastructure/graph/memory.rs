use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::warn;

use crate::domain::models::{
    CreateOutcome, NeighborRecord, NewRelationship, NodeSummary, NodeView, PropertyMap,
    RelationshipView, RELATIONSHIP_TYPE,
};

use super::{GraphError, GraphStore};

/// In-process graph with the same matching rules as the Neo4j store: nodes
/// are addressed through their `id` property, edges are created only towards
/// existing targets. Each operation runs under one lock, so it is atomic.
#[derive(Default)]
pub struct MemoryGraph {
    inner: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_key: u64,
    nodes: BTreeMap<u64, StoredNode>,
    edges: Vec<StoredEdge>,
}

struct StoredNode {
    labels: Vec<String>,
    properties: PropertyMap,
}

struct StoredEdge {
    start: u64,
    end: u64,
    kind: String,
    properties: PropertyMap,
}

impl StoredNode {
    fn has_id(&self, id: &Value) -> bool {
        !id.is_null()
            && self
                .properties
                .get("id")
                .is_some_and(|stored| values_equal(stored, id))
    }
}

/// Cypher equality: numbers compare by value, so `2` matches `2.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        _ => a == b,
    }
}

/// Applies Neo4j's property rules: nulls are dropped, maps are rejected at
/// the top level and inside lists.
fn storable(properties: &PropertyMap) -> Result<PropertyMap, GraphError> {
    let mut stored = PropertyMap::new();
    for (key, value) in properties {
        match value {
            Value::Null => continue,
            Value::Object(_) => return Err(unsupported(key)),
            Value::Array(items) if items.iter().any(Value::is_object) => {
                return Err(unsupported(key))
            }
            _ => {
                stored.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(stored)
}

fn unsupported(key: &str) -> GraphError {
    GraphError::UnsupportedValue(format!("property {key} holds a map"))
}

impl MemoryState {
    fn view(&self, key: u64) -> Option<NodeView> {
        self.nodes.get(&key).map(|node| NodeView {
            id: element_id(key),
            label: node.labels.clone(),
            attributes: node.properties.clone(),
        })
    }

    fn keys_with_id(&self, id: &Value) -> Vec<u64> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.has_id(id))
            .map(|(key, _)| *key)
            .collect()
    }
}

fn element_id(key: u64) -> String {
    format!("memory:{key}")
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn list_nodes(&self) -> Result<Vec<NodeSummary>, GraphError> {
        let state = self.inner.read();
        Ok(state
            .nodes
            .values()
            .map(|node| NodeSummary {
                id: node.properties.get("id").cloned().unwrap_or(Value::Null),
                label: node.labels.first().cloned().unwrap_or_default(),
            })
            .collect())
    }

    async fn node_with_neighbors(
        &self,
        id: i64,
    ) -> Result<Option<Vec<NeighborRecord>>, GraphError> {
        let state = self.inner.read();
        let keys = state.keys_with_id(&Value::from(id));
        if keys.is_empty() {
            return Ok(None);
        }

        let mut records = Vec::new();
        for key in keys {
            for edge in state.edges.iter().filter(|e| e.start == key || e.end == key) {
                let other = if edge.start == key { edge.end } else { edge.start };
                let (Some(node), Some(target_node)) = (state.view(key), state.view(other)) else {
                    continue;
                };
                records.push(NeighborRecord {
                    node,
                    relationship: RelationshipView {
                        kind: edge.kind.clone(),
                        attributes: edge.properties.clone(),
                    },
                    target_node,
                });
            }
        }

        Ok(Some(records))
    }

    async fn create_node_with_relationships(
        &self,
        label: &str,
        properties: &PropertyMap,
        relationships: &[NewRelationship],
    ) -> Result<CreateOutcome, GraphError> {
        let properties = storable(properties)?;
        let attributes = relationships
            .iter()
            .map(|relationship| storable(&relationship.attributes))
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = self.inner.write();

        let key = state.next_key;
        state.next_key += 1;
        state.nodes.insert(
            key,
            StoredNode {
                labels: vec![label.to_string()],
                properties,
            },
        );

        let mut outcome = CreateOutcome {
            element_id: element_id(key),
            ..CreateOutcome::default()
        };

        for (relationship, attributes) in relationships.iter().zip(&attributes) {
            let targets = state.keys_with_id(&relationship.target_id);
            if targets.is_empty() {
                outcome.relationships_skipped += 1;
                warn!(
                    target_id = %relationship.target_id,
                    "relationship target not found; edge skipped"
                );
                continue;
            }
            for target in targets {
                state.edges.push(StoredEdge {
                    start: key,
                    end: target,
                    kind: RELATIONSHIP_TYPE.to_string(),
                    properties: attributes.clone(),
                });
                outcome.relationships_created += 1;
            }
        }

        Ok(outcome)
    }

    async fn delete_node(&self, id: i64) -> Result<(), GraphError> {
        let mut state = self.inner.write();
        let keys = state.keys_with_id(&Value::from(id));
        for key in &keys {
            state.nodes.remove(key);
        }
        state
            .edges
            .retain(|edge| !keys.contains(&edge.start) && !keys.contains(&edge.end));
        Ok(())
    }
}

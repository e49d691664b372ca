use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType};
use serde_json::Value;

use crate::domain::models::{NodeView, PropertyMap, RelationshipView};

use super::GraphError;

/// Converts a JSON value into a Bolt query parameter.
///
/// Integers that fit `i64` stay integers, every other number becomes a float.
pub(crate) fn json_to_bolt(value: &Value) -> Result<BoltType, GraphError> {
    let bolt = match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => match n.as_f64() {
                Some(f) => BoltType::from(f),
                None => return Err(GraphError::UnsupportedValue(n.to_string())),
            },
        },
        Value::String(s) => BoltType::from(s.clone()),
        Value::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(json_to_bolt(item)?);
            }
            BoltType::List(list)
        }
        Value::Object(map) => map_to_bolt(map)?,
    };
    Ok(bolt)
}

pub(crate) fn map_to_bolt(map: &PropertyMap) -> Result<BoltType, GraphError> {
    let mut bolt = BoltMap::new();
    for (key, value) in map {
        bolt.put(BoltString::from(key.as_str()), json_to_bolt(value)?);
    }
    Ok(BoltType::Map(bolt))
}

pub(crate) fn node_to_view(
    node: &neo4rs::Node,
    element_id: String,
) -> Result<NodeView, GraphError> {
    let label = node.labels().iter().map(|l| l.to_string()).collect();
    let mut attributes = PropertyMap::new();
    for key in node.keys() {
        let value: Value = node.get(&key).map_err(|e| {
            GraphError::Serialization(format!("failed to read node property {key}: {e}"))
        })?;
        attributes.insert(key.to_string(), value);
    }
    Ok(NodeView {
        id: element_id,
        label,
        attributes,
    })
}

pub(crate) fn relation_to_view(rel: &neo4rs::Relation) -> Result<RelationshipView, GraphError> {
    let mut attributes = PropertyMap::new();
    for key in rel.keys() {
        let value: Value = rel.get(&key).map_err(|e| {
            GraphError::Serialization(format!("failed to read relationship property {key}: {e}"))
        })?;
        attributes.insert(key.to_string(), value);
    }
    Ok(RelationshipView {
        kind: rel.typ().to_string(),
        attributes,
    })
}

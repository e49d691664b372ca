use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open-ended property map carried by nodes and relationships.
pub type PropertyMap = serde_json::Map<String, Value>;

/// Relationship type given to every edge created through the API.
pub const RELATIONSHIP_TYPE: &str = "RELATIONSHIP_TYPE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: Value,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub label: Vec<String>,
    pub attributes: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipView {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: PropertyMap,
}

/// One incident relationship of the requested node, seen from that node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborRecord {
    pub node: NodeView,
    pub relationship: RelationshipView,
    pub target_node: NodeView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelationship {
    pub target_id: Value,
    #[serde(default)]
    pub attributes: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateOutcome {
    pub element_id: String,
    pub relationships_created: usize,
    pub relationships_skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relationship_view_serializes_kind_as_type() {
        let view = RelationshipView {
            kind: RELATIONSHIP_TYPE.to_string(),
            attributes: json!({"type": "linked"}).as_object().cloned().unwrap(),
        };

        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(
            value,
            json!({"type": "RELATIONSHIP_TYPE", "attributes": {"type": "linked"}})
        );
    }

    #[test]
    fn new_relationship_defaults_attributes() {
        let rel: NewRelationship = serde_json::from_value(json!({"target_id": 7})).unwrap();

        assert_eq!(rel.target_id, json!(7));
        assert!(rel.attributes.is_empty());
    }
}

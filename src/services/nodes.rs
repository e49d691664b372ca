use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};
use validator::Validate;

use crate::{
    domain::models::{CreateOutcome, NeighborRecord, NewRelationship, NodeSummary, PropertyMap},
    infrastructure::{graph::GraphError, state::AppState},
    validation::rules::validate_label,
};

use super::errors::ServiceError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNodeRequest {
    #[validate(custom = "validate_label")]
    pub label: String,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub relationships: Vec<NewRelationship>,
}

/// Per-request facade over the graph store. Built from shared state for each
/// handler invocation and dropped when the response is produced.
pub struct NodeService {
    pub state: Arc<AppState>,
}

impl NodeService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn list_nodes(&self) -> Result<Vec<NodeSummary>, ServiceError> {
        self.state.graph.list_nodes().await.map_err(internal)
    }

    pub async fn get_node(&self, id: i64) -> Result<Vec<NeighborRecord>, ServiceError> {
        self.state
            .graph
            .node_with_neighbors(id)
            .await
            .map_err(internal)?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn create_node(
        &self,
        payload: CreateNodeRequest,
    ) -> Result<CreateOutcome, ServiceError> {
        payload
            .validate()
            .map_err(|err| ServiceError::Validation(err.to_string()))?;

        let outcome = self
            .state
            .graph
            .create_node_with_relationships(
                &payload.label,
                &payload.properties,
                &payload.relationships,
            )
            .await
            .map_err(internal)?;

        info!(
            label = %payload.label,
            element_id = %outcome.element_id,
            created = outcome.relationships_created,
            skipped = outcome.relationships_skipped,
            "node created"
        );
        Ok(outcome)
    }

    pub async fn delete_node(&self, id: i64) -> Result<(), ServiceError> {
        self.state.graph.delete_node(id).await.map_err(internal)?;
        info!(id, "node deleted");
        Ok(())
    }
}

fn internal(err: GraphError) -> ServiceError {
    error!(error = %err, "graph operation failed");
    ServiceError::from(err)
}

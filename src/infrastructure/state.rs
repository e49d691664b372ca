use std::sync::Arc;

use crate::infrastructure::{config::Config, graph::GraphStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub graph: Arc<dyn GraphStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, graph: Arc<dyn GraphStore>) -> Self {
        Self { config, graph }
    }
}

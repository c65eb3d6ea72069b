//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::ResolutionService;

#[derive(Clone)]
pub struct AppState {
    pub resolution_service: Arc<ResolutionService>,
}

impl AppState {
    pub fn new(resolution_service: Arc<ResolutionService>) -> Self {
        Self { resolution_service }
    }
}

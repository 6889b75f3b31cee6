use std::sync::Arc;

use genie_application::{ChatPipeline, ClientStore, InsightService, SpaceService};
use genie_core::agent::{CompletionService, GenieAgent};
use genie_interaction::WorkspaceSettings;

use crate::view::Templates;

/// Application state shared across request handlers.
pub struct AppState {
    pub clients: ClientStore,
    pub chat_pipeline: Arc<ChatPipeline>,
    pub insight_service: Arc<InsightService>,
    pub space_service: Arc<SpaceService>,
    pub workspace: WorkspaceSettings,
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Wires the use cases around the two remote services.
    pub fn new(
        agent: Arc<dyn GenieAgent>,
        completion: Arc<dyn CompletionService>,
        workspace: WorkspaceSettings,
    ) -> anyhow::Result<Self> {
        let templates = Templates::new()
            .map_err(|e| anyhow::anyhow!("Failed to compile templates: {e}"))?;

        Ok(Self {
            clients: ClientStore::new(),
            chat_pipeline: Arc::new(ChatPipeline::new(agent.clone())),
            insight_service: Arc::new(InsightService::new(completion)),
            space_service: Arc::new(SpaceService::new(agent)),
            workspace,
            templates: Arc::new(templates),
        })
    }

    /// Replaces the client registry, e.g. to apply a configured idle timeout.
    pub fn with_clients(mut self, clients: ClientStore) -> Self {
        self.clients = clients;
        self
    }
}

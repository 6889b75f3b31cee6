use crate::client::ClientState;
use genie_core::agent::GenieAgent;
use genie_core::space::Space;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lists the agents a user can pick from.
pub struct SpaceService {
    agent: Arc<dyn GenieAgent>,
}

impl SpaceService {
    pub fn new(agent: Arc<dyn GenieAgent>) -> Self {
        Self { agent }
    }

    /// Lists spaces; a failed listing is an empty list.
    pub async fn list_spaces(&self, access_token: Option<&str>) -> Vec<Space> {
        match self.agent.list_spaces(access_token).await {
            Ok(spaces) => spaces,
            Err(e) => {
                tracing::warn!("Error fetching spaces: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetches the space list into the client's selection state.
    pub async fn refresh(&self, client: &Mutex<ClientState>, access_token: Option<&str>) -> usize {
        let spaces = self.list_spaces(access_token).await;
        let count = spaces.len();
        client.lock().await.selection.list(spaces);
        count
    }
}

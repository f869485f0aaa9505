use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::{ChannelInstance, ChannelType, GroupCandidate};

/// The externally provided send operation. The dispatcher treats it as
/// opaque; routing happens through the company's channel instance.
#[async_trait]
pub trait TransportClient: Send + Sync {
    fn channel(&self) -> ChannelType;

    async fn send_text(
        &self,
        instance: &ChannelInstance,
        destination: &str,
        text: &str,
    ) -> anyhow::Result<()>;

    /// Groups visible to the instance, for the broadcast selection UI.
    async fn fetch_groups(&self, instance: &ChannelInstance) -> anyhow::Result<Vec<GroupCandidate>>;
}

#[derive(Clone)]
pub struct TransportGateway {
    clients: HashMap<ChannelType, Arc<dyn TransportClient>>,
}

impl TransportGateway {
    pub fn new(clients: Vec<Arc<dyn TransportClient>>) -> Self {
        let mut map = HashMap::new();
        for client in clients {
            map.insert(client.channel(), client);
        }
        Self { clients: map }
    }

    pub fn get(&self, channel: ChannelType) -> Option<Arc<dyn TransportClient>> {
        self.clients.get(&channel).cloned()
    }
}

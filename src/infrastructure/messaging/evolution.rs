use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    application::services::transport::TransportClient,
    domain::models::{ChannelInstance, ChannelType, GroupCandidate},
};

/// WhatsApp transport over an Evolution-style HTTP API. Routing happens
/// per request through the company's instance name; one client serves
/// every tenant.
pub struct EvolutionClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EvolutionClient {
    pub fn new(base_url: String, api_key: String) -> Arc<dyn TransportClient> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("broadcast-service/whatsapp")
                .build()
                .expect("failed to build whatsapp client"),
            base_url,
            api_key,
        }) as Arc<dyn TransportClient>
    }

    fn build_url(&self, path: &str, instance: &ChannelInstance) -> String {
        format!("{}/{}/{}", self.base_url, path, instance.name)
    }

    fn map_group(group: EvolutionGroup) -> GroupCandidate {
        let name = group
            .subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Unnamed group".to_string());
        GroupCandidate {
            group_id: group.id,
            name,
            selected: false,
        }
    }
}

#[async_trait]
impl TransportClient for EvolutionClient {
    fn channel(&self) -> ChannelType {
        ChannelType::Whatsapp
    }

    async fn send_text(
        &self,
        instance: &ChannelInstance,
        destination: &str,
        text: &str,
    ) -> anyhow::Result<()> {
        let url = self.build_url("message/sendText", instance);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&json!({
                "number": destination,
                "text": text,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("whatsapp api rejected send ({status}): {body}");
        }
        Ok(())
    }

    async fn fetch_groups(
        &self,
        instance: &ChannelInstance,
    ) -> anyhow::Result<Vec<GroupCandidate>> {
        let url = self.build_url("group/fetchAllGroups", instance);
        let response = self
            .http
            .get(url)
            .header("apikey", &self.api_key)
            .query(&[("getParticipants", "false")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("whatsapp api rejected group listing ({status}): {body}");
        }

        let groups: Vec<EvolutionGroup> = response.json().await?;
        Ok(groups.into_iter().map(Self::map_group).collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EvolutionGroup {
    id: String,
    subject: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_groups_get_a_placeholder_title() {
        let group = EvolutionGroup {
            id: "123@g.us".to_string(),
            subject: Some("   ".to_string()),
        };
        let mapped = EvolutionClient::map_group(group);
        assert_eq!(mapped.name, "Unnamed group");
        assert!(!mapped.selected);
    }

    #[test]
    fn group_payload_deserializes_without_subject() {
        let payload = r#"[{"id": "123@g.us"}, {"id": "456@g.us", "subject": "Festas"}]"#;
        let groups: Vec<EvolutionGroup> = serde_json::from_str(payload).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].subject.as_deref(), Some("Festas"));
    }
}

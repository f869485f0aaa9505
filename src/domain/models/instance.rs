use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Whatsapp,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Whatsapp => "whatsapp",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "whatsapp" => Some(ChannelType::Whatsapp),
            _ => None,
        }
    }
}

/// A company's connection to the messaging channel. The instance name is
/// the routing identifier the transport API expects on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInstance {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub status: InstanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InstanceStatus {
    Connected,
    Disconnected,
}

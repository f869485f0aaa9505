use serde::{Deserialize, Serialize};

/// A guest row as it arrives from the CRM roster, before eligibility
/// filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestCandidate {
    pub name: String,
    pub phone: String,
    pub wants_info: bool,
}

/// A WhatsApp group entry as shown in the selection UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCandidate {
    pub group_id: String,
    pub name: String,
    pub selected: bool,
}

/// A single send target for one dispatch run. Materialized at
/// session-start time and immutable for the duration of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryState {
    Pending,
    Sending,
    Sent,
    Failed { reason: String },
}

impl DeliveryState {
    /// Sent and Failed are terminal; a recipient never leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryState::Sent | DeliveryState::Failed { .. })
    }
}

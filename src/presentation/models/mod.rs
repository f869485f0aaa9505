use poem_openapi::Enum;

use crate::domain::models::{DeliveryState, DispatchPhase, InstanceStatus};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum AudienceKind {
    #[oai(rename = "guests")]
    Guests,
    #[oai(rename = "groups")]
    Groups,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeliveryStateDto {
    Pending,
    Sending,
    Sent,
    Failed,
}

impl From<&DeliveryState> for DeliveryStateDto {
    fn from(value: &DeliveryState) -> Self {
        match value {
            DeliveryState::Pending => DeliveryStateDto::Pending,
            DeliveryState::Sending => DeliveryStateDto::Sending,
            DeliveryState::Sent => DeliveryStateDto::Sent,
            DeliveryState::Failed { .. } => DeliveryStateDto::Failed,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum DispatchPhaseDto {
    Running,
    Completed,
    Cancelled,
}

impl From<DispatchPhase> for DispatchPhaseDto {
    fn from(value: DispatchPhase) -> Self {
        match value {
            DispatchPhase::Running => DispatchPhaseDto::Running,
            DispatchPhase::Completed => DispatchPhaseDto::Completed,
            DispatchPhase::Cancelled => DispatchPhaseDto::Cancelled,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum InstanceStatusKind {
    #[oai(rename = "connected")]
    Connected,
    #[oai(rename = "disconnected")]
    Disconnected,
}

impl Default for InstanceStatusKind {
    fn default() -> Self {
        InstanceStatusKind::Connected
    }
}

impl From<InstanceStatusKind> for InstanceStatus {
    fn from(value: InstanceStatusKind) -> Self {
        match value {
            InstanceStatusKind::Connected => InstanceStatus::Connected,
            InstanceStatusKind::Disconnected => InstanceStatus::Disconnected,
        }
    }
}

impl From<InstanceStatus> for InstanceStatusKind {
    fn from(value: InstanceStatus) -> Self {
        match value {
            InstanceStatus::Connected => InstanceStatusKind::Connected,
            InstanceStatus::Disconnected => InstanceStatusKind::Disconnected,
        }
    }
}

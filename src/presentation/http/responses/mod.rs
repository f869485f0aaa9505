use poem_openapi::Object;
use uuid::Uuid;

use crate::presentation::models::{DeliveryStateDto, DispatchPhaseDto, InstanceStatusKind};

#[derive(Object)]
pub struct StartDispatchResponseDto {
    pub dispatch_id: Uuid,
    pub total: u32,
    pub skipped_already_delivered: u32,
}

#[derive(Object)]
pub struct RecipientProgressDto {
    pub name: String,
    pub address: String,
    pub state: DeliveryStateDto,
    pub error: Option<String>,
}

#[derive(Object)]
pub struct DispatchStatusDto {
    pub dispatch_id: Uuid,
    pub campaign_id: Uuid,
    pub started_at: String,
    pub phase: DispatchPhaseDto,
    pub total: u32,
    pub current_index: u32,
    pub percent: f32,
    pub waiting_secs: Option<u64>,
    pub sent: u32,
    pub failed: u32,
    pub recipients: Vec<RecipientProgressDto>,
}

#[derive(Object)]
pub struct CancelDispatchResponseDto {
    pub cancelled: bool,
}

#[derive(Object)]
pub struct DeliveryRecordDto {
    pub id: Uuid,
    pub dispatch_id: Uuid,
    pub address: String,
    pub recipient_name: String,
    pub state: DeliveryStateDto,
    pub error: Option<String>,
    pub attempt: u32,
    pub created_at: String,
}

#[derive(Object)]
pub struct GroupDto {
    pub group_id: String,
    pub name: String,
}

#[derive(Object)]
pub struct CampaignSettingsDto {
    pub templates: Vec<String>,
    pub delay_min_secs: u64,
    pub delay_max_secs: u64,
    pub group_delay_secs: u64,
    pub updated_at: String,
}

#[derive(Object)]
pub struct InstanceDto {
    pub id: Uuid,
    pub name: String,
    pub status: InstanceStatusKind,
    pub updated_at: String,
}

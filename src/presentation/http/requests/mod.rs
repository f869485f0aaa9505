use poem_openapi::Object;
use uuid::Uuid;

use crate::presentation::models::{AudienceKind, InstanceStatusKind};

#[derive(Object, Debug)]
pub struct GuestCandidateDto {
    #[oai(validator(min_length = 1))]
    pub name: String,
    pub phone: String,
    pub wants_info: bool,
}

#[derive(Object, Debug)]
pub struct GroupCandidateDto {
    #[oai(validator(min_length = 1))]
    pub group_id: String,
    pub name: String,
    #[oai(default)]
    pub selected: bool,
}

#[derive(Object, Debug)]
pub struct StartDispatchRequestDto {
    pub campaign_id: Uuid,
    pub audience: AudienceKind,
    #[oai(default)]
    pub guests: Vec<GuestCandidateDto>,
    #[oai(default)]
    pub groups: Vec<GroupCandidateDto>,
    pub company_name: Option<String>,
    pub period: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    /// Single-body override for this dispatch; the stored template pool
    /// is used when absent.
    #[oai(validator(max_length = 4096))]
    pub template: Option<String>,
    pub delay_min_secs: Option<u64>,
    pub delay_max_secs: Option<u64>,
}

#[derive(Object, Debug)]
pub struct UpdateSettingsRequestDto {
    #[oai(validator(min_items = 1))]
    pub templates: Vec<String>,
    pub delay_min_secs: u64,
    pub delay_max_secs: u64,
    pub group_delay_secs: u64,
}

#[derive(Object, Debug)]
pub struct RegisterInstanceRequestDto {
    #[oai(validator(min_length = 1))]
    pub name: String,
    #[oai(default)]
    pub status: InstanceStatusKind,
}

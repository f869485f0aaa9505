use std::sync::Arc;

use poem::{Error as PoemError, http::StatusCode};
use poem_openapi::Tags;

use crate::application::services::jwt::JwtServiceConfig;
use crate::application::usecases::{
    cancel_dispatch::CancelDispatchUseCase, get_dispatch_status::GetDispatchStatusUseCase,
    get_settings::GetSettingsUseCase, list_deliveries::ListDeliveriesUseCase,
    list_groups::ListGroupsUseCase, list_instances::ListInstancesUseCase,
    register_instance::RegisterInstanceUseCase, start_dispatch::StartDispatchUseCase,
    update_settings::UpdateSettingsUseCase,
};
use crate::domain::errors::DomainError;

#[derive(Clone)]
pub struct ApiState {
    pub start_dispatch_usecase: Arc<StartDispatchUseCase>,
    pub cancel_dispatch_usecase: Arc<CancelDispatchUseCase>,
    pub dispatch_status_usecase: Arc<GetDispatchStatusUseCase>,
    pub list_deliveries_usecase: Arc<ListDeliveriesUseCase>,
    pub list_groups_usecase: Arc<ListGroupsUseCase>,
    pub register_instance_usecase: Arc<RegisterInstanceUseCase>,
    pub list_instances_usecase: Arc<ListInstancesUseCase>,
    pub get_settings_usecase: Arc<GetSettingsUseCase>,
    pub update_settings_usecase: Arc<UpdateSettingsUseCase>,
    pub jwt_config: JwtServiceConfig,
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Dispatches,
    Groups,
    Instances,
    Settings,
}

pub fn domain_error(err: DomainError) -> PoemError {
    let status = match &err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Precondition(_) => StatusCode::PRECONDITION_FAILED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    PoemError::from_string(err.to_string(), status)
}

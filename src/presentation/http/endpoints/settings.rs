use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, payload::Json};

use crate::{
    application::usecases::update_settings::UpdateSettingsRequest,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags, domain_error},
        mappers::map_settings,
        requests::UpdateSettingsRequestDto,
        responses::CampaignSettingsDto,
        security::JwtAuth,
    },
};

pub struct SettingsEndpoints {
    state: Arc<ApiState>,
}

impl SettingsEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl SettingsEndpoints {
    #[oai(path = "/settings", method = "get", tag = EndpointsTags::Settings)]
    pub async fn get_settings(&self, auth: JwtAuth) -> PoemResult<Json<CampaignSettingsDto>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;

        let settings = self
            .state
            .get_settings_usecase
            .execute(operator.company_id)
            .await
            .map_err(domain_error)?;

        Ok(Json(map_settings(&settings)))
    }

    #[oai(path = "/settings", method = "put", tag = EndpointsTags::Settings)]
    pub async fn update_settings(
        &self,
        auth: JwtAuth,
        request: Json<UpdateSettingsRequestDto>,
    ) -> PoemResult<Json<CampaignSettingsDto>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;
        let request = request.0;

        let settings = self
            .state
            .update_settings_usecase
            .execute(UpdateSettingsRequest {
                company_id: operator.company_id,
                templates: request.templates,
                delay_min_secs: request.delay_min_secs,
                delay_max_secs: request.delay_max_secs,
                group_delay_secs: request.group_delay_secs,
            })
            .await
            .map_err(domain_error)?;

        Ok(Json(map_settings(&settings)))
    }
}

use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, payload::Json};

use crate::{
    application::usecases::register_instance::RegisterInstanceRequest,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags, domain_error},
        mappers::map_instance,
        requests::RegisterInstanceRequestDto,
        responses::InstanceDto,
        security::JwtAuth,
    },
};

pub struct InstancesEndpoints {
    state: Arc<ApiState>,
}

impl InstancesEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl InstancesEndpoints {
    #[oai(path = "/instances", method = "post", tag = EndpointsTags::Instances)]
    pub async fn register_instance(
        &self,
        auth: JwtAuth,
        request: Json<RegisterInstanceRequestDto>,
    ) -> PoemResult<Json<InstanceDto>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;

        let instance = self
            .state
            .register_instance_usecase
            .execute(RegisterInstanceRequest {
                company_id: operator.company_id,
                name: request.0.name,
                status: request.0.status.into(),
            })
            .await
            .map_err(domain_error)?;

        Ok(Json(map_instance(&instance)))
    }

    #[oai(path = "/instances", method = "get", tag = EndpointsTags::Instances)]
    pub async fn list_instances(&self, auth: JwtAuth) -> PoemResult<Json<Vec<InstanceDto>>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;

        let instances = self
            .state
            .list_instances_usecase
            .execute(operator.company_id)
            .await
            .map_err(domain_error)?;

        Ok(Json(instances.iter().map(map_instance).collect()))
    }
}

use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, payload::Json};

use crate::presentation::http::{
    endpoints::root::{ApiState, EndpointsTags, domain_error},
    mappers::map_group,
    responses::GroupDto,
    security::JwtAuth,
};

pub struct GroupsEndpoints {
    state: Arc<ApiState>,
}

impl GroupsEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl GroupsEndpoints {
    #[oai(path = "/groups", method = "get", tag = EndpointsTags::Groups)]
    pub async fn list_groups(&self, auth: JwtAuth) -> PoemResult<Json<Vec<GroupDto>>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;

        let groups = self
            .state
            .list_groups_usecase
            .execute(operator.company_id)
            .await
            .map_err(domain_error)?;

        Ok(Json(groups.iter().map(map_group).collect()))
    }
}

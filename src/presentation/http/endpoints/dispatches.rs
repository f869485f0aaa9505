use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, param::Path, payload::Json};
use uuid::Uuid;

use crate::{
    application::usecases::{
        cancel_dispatch::CancelDispatchRequest,
        start_dispatch::{DispatchAudience, StartDispatchRequest},
    },
    domain::models::{GroupCandidate, GuestCandidate, TemplateVars},
    presentation::{
        http::{
            endpoints::root::{ApiState, EndpointsTags, domain_error},
            mappers::{map_delivery, map_snapshot},
            requests::StartDispatchRequestDto,
            responses::{
                CancelDispatchResponseDto, DeliveryRecordDto, DispatchStatusDto,
                StartDispatchResponseDto,
            },
            security::JwtAuth,
        },
        models::AudienceKind,
    },
};

pub struct DispatchesEndpoints {
    state: Arc<ApiState>,
}

impl DispatchesEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl DispatchesEndpoints {
    #[oai(
        path = "/dispatches",
        method = "post",
        tag = EndpointsTags::Dispatches,
    )]
    pub async fn start_dispatch(
        &self,
        auth: JwtAuth,
        request: Json<StartDispatchRequestDto>,
    ) -> PoemResult<Json<StartDispatchResponseDto>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;
        let request = request.0;

        let audience = match request.audience {
            AudienceKind::Guests => DispatchAudience::Guests(
                request
                    .guests
                    .into_iter()
                    .map(|guest| GuestCandidate {
                        name: guest.name,
                        phone: guest.phone,
                        wants_info: guest.wants_info,
                    })
                    .collect(),
            ),
            AudienceKind::Groups => DispatchAudience::Groups(
                request
                    .groups
                    .into_iter()
                    .map(|group| GroupCandidate {
                        group_id: group.group_id,
                        name: group.name,
                        selected: group.selected,
                    })
                    .collect(),
            ),
        };

        let mut vars = TemplateVars::new();
        if let Some(company) = &request.company_name {
            vars.insert("company", company.clone());
        }
        if let Some(period) = &request.period {
            vars.insert("period", period.clone());
        }
        if let Some(link) = &request.link {
            vars.insert("link", link.clone());
        }
        if let Some(notes) = &request.notes {
            vars.insert("notes", notes.clone());
        }

        let payload = StartDispatchRequest {
            company_id: operator.company_id,
            campaign_id: request.campaign_id,
            audience,
            vars,
            template_override: request.template,
            delay_min_secs: request.delay_min_secs,
            delay_max_secs: request.delay_max_secs,
        };

        let response = self
            .state
            .start_dispatch_usecase
            .execute(payload)
            .await
            .map_err(domain_error)?;

        tracing::info!(
            dispatch = %response.dispatch_id,
            operator = %operator.operator_id,
            "dispatch started"
        );

        Ok(Json(StartDispatchResponseDto {
            dispatch_id: response.dispatch_id,
            total: response.total,
            skipped_already_delivered: response.skipped_already_delivered,
        }))
    }

    #[oai(
        path = "/dispatches/:dispatch_id",
        method = "get",
        tag = EndpointsTags::Dispatches,
    )]
    pub async fn dispatch_status(
        &self,
        auth: JwtAuth,
        dispatch_id: Path<Uuid>,
    ) -> PoemResult<Json<DispatchStatusDto>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;

        let snapshot = self
            .state
            .dispatch_status_usecase
            .execute(dispatch_id.0, operator.company_id)
            .await
            .map_err(domain_error)?;

        Ok(Json(map_snapshot(&snapshot)))
    }

    #[oai(
        path = "/dispatches/:dispatch_id/cancel",
        method = "post",
        tag = EndpointsTags::Dispatches,
    )]
    pub async fn cancel_dispatch(
        &self,
        auth: JwtAuth,
        dispatch_id: Path<Uuid>,
    ) -> PoemResult<Json<CancelDispatchResponseDto>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;

        self.state
            .cancel_dispatch_usecase
            .execute(CancelDispatchRequest {
                company_id: operator.company_id,
                dispatch_id: dispatch_id.0,
            })
            .await
            .map_err(domain_error)?;

        Ok(Json(CancelDispatchResponseDto { cancelled: true }))
    }

    #[oai(
        path = "/dispatches/:dispatch_id/deliveries",
        method = "get",
        tag = EndpointsTags::Dispatches,
    )]
    pub async fn list_deliveries(
        &self,
        auth: JwtAuth,
        dispatch_id: Path<Uuid>,
    ) -> PoemResult<Json<Vec<DeliveryRecordDto>>> {
        let operator = auth.into_operator(&self.state.jwt_config)?;

        let records = self
            .state
            .list_deliveries_usecase
            .execute(dispatch_id.0, operator.company_id)
            .await
            .map_err(domain_error)?;

        Ok(Json(records.iter().map(map_delivery).collect()))
    }
}

use poem::{Error as PoemError, Result as PoemResult, http::StatusCode};
use poem_openapi::SecurityScheme;
use poem_openapi::auth::Bearer;
use uuid::Uuid;

use crate::application::services::jwt::{JwtService, JwtServiceConfig};

#[derive(SecurityScheme)]
#[oai(ty = "bearer", bearer_format = "JWT")]
pub struct JwtAuth(pub Bearer);

pub struct AuthenticatedOperator {
    pub operator_id: Uuid,
    pub company_id: Uuid,
}

impl JwtAuth {
    pub fn into_operator(self, config: &JwtServiceConfig) -> PoemResult<AuthenticatedOperator> {
        let service = JwtService::new(config.clone());
        match service.verify(&self.0.token) {
            Ok(claims) => Ok(AuthenticatedOperator {
                operator_id: claims.sub,
                company_id: claims.company_id,
            }),
            Err(_) => Err(PoemError::from_string(
                "invalid or expired token",
                StatusCode::UNAUTHORIZED,
            )),
        }
    }
}

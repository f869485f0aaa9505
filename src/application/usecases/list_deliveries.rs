use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    errors::DomainError, models::delivery::DeliveryRecord,
    repositories::DeliveryLogRepository,
};

/// Per-recipient outcome list served from the durable log, so it stays
/// available after the in-memory session is gone.
pub struct ListDeliveriesUseCase {
    log_repo: Arc<dyn DeliveryLogRepository>,
}

impl ListDeliveriesUseCase {
    pub fn new(log_repo: Arc<dyn DeliveryLogRepository>) -> Self {
        Self { log_repo }
    }

    pub async fn execute(
        &self,
        dispatch_id: Uuid,
        company_id: Uuid,
    ) -> Result<Vec<DeliveryRecord>, DomainError> {
        let records = self.log_repo.list_by_dispatch(dispatch_id).await?;
        if records.is_empty() {
            return Err(DomainError::NotFound(format!("dispatch {dispatch_id}")));
        }
        if records.iter().any(|record| record.company_id != company_id) {
            return Err(DomainError::Forbidden(
                "dispatch does not belong to company".to_string(),
            ));
        }
        Ok(records)
    }
}

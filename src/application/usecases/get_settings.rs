use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    errors::DomainError, models::CampaignSettings, repositories::SettingsRepository,
};

/// Stored settings, or the built-in defaults when nothing is stored yet.
pub struct GetSettingsUseCase {
    settings_repo: Arc<dyn SettingsRepository>,
}

impl GetSettingsUseCase {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    pub async fn execute(&self, company_id: Uuid) -> Result<CampaignSettings, DomainError> {
        Ok(self
            .settings_repo
            .get(&company_id)
            .await?
            .unwrap_or_else(|| CampaignSettings::fallback(company_id)))
    }
}

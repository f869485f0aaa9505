use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    errors::DomainError, models::CampaignSettings, repositories::SettingsRepository,
};

pub struct UpdateSettingsUseCase {
    settings_repo: Arc<dyn SettingsRepository>,
}

pub struct UpdateSettingsRequest {
    pub company_id: Uuid,
    pub templates: Vec<String>,
    pub delay_min_secs: u64,
    pub delay_max_secs: u64,
    pub group_delay_secs: u64,
}

impl UpdateSettingsUseCase {
    pub fn new(settings_repo: Arc<dyn SettingsRepository>) -> Self {
        Self { settings_repo }
    }

    pub async fn execute(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<CampaignSettings, DomainError> {
        if request.templates.iter().all(|t| t.trim().is_empty()) {
            return Err(DomainError::Validation(
                "at least one non-empty template is required".to_string(),
            ));
        }
        if request.delay_min_secs > request.delay_max_secs {
            return Err(DomainError::Validation(
                "delay_min_secs must not exceed delay_max_secs".to_string(),
            ));
        }

        let settings = CampaignSettings {
            company_id: request.company_id,
            templates: request.templates,
            delay_min_secs: request.delay_min_secs,
            delay_max_secs: request.delay_max_secs,
            group_delay_secs: request.group_delay_secs,
            updated_at: Utc::now(),
        };
        self.settings_repo.upsert(settings.clone()).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::in_memory::InMemorySettingsRepository;

    #[tokio::test]
    async fn stores_and_returns_updated_settings() {
        let repo = Arc::new(InMemorySettingsRepository::new());
        let usecase = UpdateSettingsUseCase::new(repo.clone());
        let company_id = Uuid::new_v4();

        let stored = usecase
            .execute(UpdateSettingsRequest {
                company_id,
                templates: vec!["Oi {name}!".to_string()],
                delay_min_secs: 6,
                delay_max_secs: 20,
                group_delay_secs: 12,
            })
            .await
            .unwrap();
        assert_eq!(stored.delay_min_secs, 6);

        let fetched = repo.get(&company_id).await.unwrap().unwrap();
        assert_eq!(fetched.templates, vec!["Oi {name}!".to_string()]);
    }

    #[tokio::test]
    async fn rejects_blank_template_set() {
        let usecase = UpdateSettingsUseCase::new(Arc::new(InMemorySettingsRepository::new()));
        let result = usecase
            .execute(UpdateSettingsRequest {
                company_id: Uuid::new_v4(),
                templates: vec!["  ".to_string()],
                delay_min_secs: 5,
                delay_max_secs: 10,
                group_delay_secs: 10,
            })
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn rejects_inverted_delay_window() {
        let usecase = UpdateSettingsUseCase::new(Arc::new(InMemorySettingsRepository::new()));
        let result = usecase
            .execute(UpdateSettingsRequest {
                company_id: Uuid::new_v4(),
                templates: vec!["Oi {name}!".to_string()],
                delay_min_secs: 20,
                delay_max_secs: 10,
                group_delay_secs: 10,
            })
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}

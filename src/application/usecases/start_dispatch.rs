use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    application::{
        handlers::paced_dispatcher::PacedDispatcher,
        services::{
            delay::RandomDelay,
            progress::WatchProgress,
            registry::{DispatchHandle, DispatchRegistry},
            transport::TransportGateway,
        },
    },
    domain::{
        errors::DomainError,
        models::{
            CampaignSettings, ChannelType, DelayPolicy, DispatchSession, GroupCandidate,
            GuestCandidate, TemplatePool, TemplateVars,
        },
        repositories::{DeliveryLogRepository, InstanceRepository, SettingsRepository},
        selection,
    },
};

pub enum DispatchAudience {
    Guests(Vec<GuestCandidate>),
    Groups(Vec<GroupCandidate>),
}

pub struct StartDispatchRequest {
    pub company_id: Uuid,
    pub campaign_id: Uuid,
    pub audience: DispatchAudience,
    pub vars: TemplateVars,
    pub template_override: Option<String>,
    pub delay_min_secs: Option<u64>,
    pub delay_max_secs: Option<u64>,
}

pub struct StartDispatchResponse {
    pub dispatch_id: Uuid,
    pub total: u32,
    pub skipped_already_delivered: u32,
}

pub struct StartDispatchUseCase {
    instance_repo: Arc<dyn InstanceRepository>,
    settings_repo: Arc<dyn SettingsRepository>,
    log_repo: Arc<dyn DeliveryLogRepository>,
    gateway: TransportGateway,
    registry: Arc<DispatchRegistry>,
}

impl StartDispatchUseCase {
    pub fn new(
        instance_repo: Arc<dyn InstanceRepository>,
        settings_repo: Arc<dyn SettingsRepository>,
        log_repo: Arc<dyn DeliveryLogRepository>,
        gateway: TransportGateway,
        registry: Arc<DispatchRegistry>,
    ) -> Self {
        Self {
            instance_repo,
            settings_repo,
            log_repo,
            gateway,
            registry,
        }
    }

    pub async fn execute(
        &self,
        request: StartDispatchRequest,
    ) -> Result<StartDispatchResponse, DomainError> {
        if self.registry.has_running(&request.campaign_id).await {
            return Err(DomainError::AlreadyExists(format!(
                "campaign {} already has a dispatch running",
                request.campaign_id
            )));
        }

        // Missing channel instance aborts before any send is attempted.
        let instance = self
            .instance_repo
            .find_connected(&request.company_id)
            .await?
            .ok_or_else(|| {
                DomainError::Precondition("no connected whatsapp instance".to_string())
            })?;

        let client = self.gateway.get(ChannelType::Whatsapp).ok_or_else(|| {
            DomainError::Precondition("no transport registered for whatsapp".to_string())
        })?;

        let settings = self.load_settings(&request.company_id).await;

        let (mut recipients, delay_policy) = match &request.audience {
            DispatchAudience::Guests(guests) => {
                let policy = match (request.delay_min_secs, request.delay_max_secs) {
                    (Some(min), Some(max)) => DelayPolicy::for_guests(min, max),
                    _ => settings.guest_delay(),
                };
                (selection::eligible_guests(guests), policy)
            }
            DispatchAudience::Groups(groups) => {
                (selection::selected_groups(groups), settings.group_delay())
            }
        };

        let delivered = self.delivered_addresses(request.campaign_id).await;
        let before = recipients.len();
        recipients.retain(|recipient| !delivered.contains(&recipient.address));
        let skipped = (before - recipients.len()) as u32;

        if recipients.is_empty() {
            return Err(DomainError::Validation(
                "no eligible recipients to send to".to_string(),
            ));
        }

        let pool = match &request.template_override {
            Some(template) if !template.trim().is_empty() => {
                TemplatePool::new(vec![template.clone()])
            }
            _ => settings.template_pool(),
        };

        let session = DispatchSession::new(request.company_id, request.campaign_id, recipients);
        let dispatch_id = session.id;
        let total = session.total() as u32;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (sink, progress_rx) = WatchProgress::channel(session.snapshot(None));
        self.registry
            .insert(
                dispatch_id,
                DispatchHandle {
                    company_id: request.company_id,
                    campaign_id: request.campaign_id,
                    cancel: cancel_tx,
                    progress: progress_rx,
                },
            )
            .await;

        info!(
            dispatch = %dispatch_id,
            campaign = %request.campaign_id,
            total,
            skipped,
            "dispatch session created"
        );

        let dispatcher = PacedDispatcher::new(
            client,
            Arc::new(RandomDelay::new(delay_policy)),
            self.log_repo.clone(),
            Arc::new(sink),
        );
        let vars = request.vars;
        tokio::spawn(async move {
            dispatcher.run(session, instance, pool, vars, cancel_rx).await;
        });

        Ok(StartDispatchResponse {
            dispatch_id,
            total,
            skipped_already_delivered: skipped,
        })
    }

    /// Stored settings when available; the built-in defaults when the
    /// fetch fails or nothing is stored yet.
    async fn load_settings(&self, company_id: &Uuid) -> CampaignSettings {
        match self.settings_repo.get(company_id).await {
            Ok(Some(settings)) => settings,
            Ok(None) => CampaignSettings::fallback(*company_id),
            Err(err) => {
                warn!(company = %company_id, error = %err, "settings fetch failed, using defaults");
                CampaignSettings::fallback(*company_id)
            }
        }
    }

    async fn delivered_addresses(&self, campaign_id: Uuid) -> HashSet<String> {
        match self.log_repo.delivered_addresses(campaign_id).await {
            Ok(addresses) => addresses,
            Err(err) => {
                warn!(campaign = %campaign_id, error = %err, "delivery log lookup failed, not skipping anyone");
                HashSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::application::services::transport::TransportClient;
    use crate::domain::models::delivery::DeliveryRecord;
    use crate::domain::models::{
        ChannelInstance, DeliveryState, DispatchPhase, InstanceStatus,
    };
    use crate::infrastructure::repositories::in_memory::{
        InMemoryDeliveryLogRepository, InMemoryInstanceRepository, InMemorySettingsRepository,
    };

    struct RecordingTransport {
        sends: Mutex<Vec<(String, String)>>,
    }

    impl RecordingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sends: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TransportClient for RecordingTransport {
        fn channel(&self) -> ChannelType {
            ChannelType::Whatsapp
        }

        async fn send_text(
            &self,
            _instance: &ChannelInstance,
            destination: &str,
            text: &str,
        ) -> anyhow::Result<()> {
            self.sends
                .lock()
                .unwrap()
                .push((destination.to_string(), text.to_string()));
            Ok(())
        }

        async fn fetch_groups(
            &self,
            _instance: &ChannelInstance,
        ) -> anyhow::Result<Vec<GroupCandidate>> {
            Ok(Vec::new())
        }
    }

    struct FailingSettingsRepository;

    #[async_trait]
    impl SettingsRepository for FailingSettingsRepository {
        async fn get(&self, _company_id: &Uuid) -> anyhow::Result<Option<CampaignSettings>> {
            anyhow::bail!("settings store unavailable")
        }

        async fn upsert(&self, _settings: CampaignSettings) -> anyhow::Result<()> {
            anyhow::bail!("settings store unavailable")
        }
    }

    struct Fixture {
        company_id: Uuid,
        transport: Arc<RecordingTransport>,
        instance_repo: Arc<InMemoryInstanceRepository>,
        log_repo: Arc<InMemoryDeliveryLogRepository>,
        registry: Arc<DispatchRegistry>,
        usecase: StartDispatchUseCase,
    }

    async fn fixture_with_settings(settings_repo: Arc<dyn SettingsRepository>) -> Fixture {
        let company_id = Uuid::new_v4();
        let transport = RecordingTransport::new();
        let instance_repo = Arc::new(InMemoryInstanceRepository::new());
        let log_repo = Arc::new(InMemoryDeliveryLogRepository::new());
        let registry = Arc::new(DispatchRegistry::new());
        let usecase = StartDispatchUseCase::new(
            instance_repo.clone(),
            settings_repo,
            log_repo.clone(),
            TransportGateway::new(vec![transport.clone() as Arc<dyn TransportClient>]),
            registry.clone(),
        );
        Fixture {
            company_id,
            transport,
            instance_repo,
            log_repo,
            registry,
            usecase,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_settings(Arc::new(InMemorySettingsRepository::new())).await
    }

    async fn connect_instance(f: &Fixture) {
        f.instance_repo
            .upsert(ChannelInstance {
                id: Uuid::new_v4(),
                company_id: f.company_id,
                name: "buffet-principal".to_string(),
                status: InstanceStatus::Connected,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    fn guests(names: &[(&str, &str, bool)]) -> DispatchAudience {
        DispatchAudience::Guests(
            names
                .iter()
                .map(|(name, phone, wants_info)| GuestCandidate {
                    name: name.to_string(),
                    phone: phone.to_string(),
                    wants_info: *wants_info,
                })
                .collect(),
        )
    }

    fn request(company_id: Uuid, campaign_id: Uuid, audience: DispatchAudience) -> StartDispatchRequest {
        StartDispatchRequest {
            company_id,
            campaign_id,
            audience,
            vars: TemplateVars::new().with("company", "Buffet Alegria"),
            template_override: Some("Oi {name}!".to_string()),
            delay_min_secs: None,
            delay_max_secs: None,
        }
    }

    async fn wait_finished(f: &Fixture, dispatch_id: Uuid) {
        for _ in 0..10_000 {
            match f.registry.snapshot(&dispatch_id).await {
                Some(snapshot) if snapshot.phase != DispatchPhase::Running => return,
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
        panic!("dispatch {dispatch_id} never finished");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_instance_aborts_before_any_send() {
        let f = fixture().await;
        let result = f
            .usecase
            .execute(request(
                f.company_id,
                Uuid::new_v4(),
                guests(&[("Ana", "11987654321", true)]),
            ))
            .await;
        assert!(matches!(result, Err(DomainError::Precondition(_))));
        assert!(f.transport.sends.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn no_eligible_recipients_is_rejected() {
        let f = fixture().await;
        connect_instance(&f).await;
        let result = f
            .usecase
            .execute(request(
                f.company_id,
                Uuid::new_v4(),
                guests(&[("Ana", "123", true), ("Beto", "11987654321", false)]),
            ))
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(f.transport.sends.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_runs_to_completion_and_logs_deliveries() {
        let f = fixture().await;
        connect_instance(&f).await;
        let campaign_id = Uuid::new_v4();
        let response = f
            .usecase
            .execute(request(
                f.company_id,
                campaign_id,
                guests(&[
                    ("Ana", "11911111111", true),
                    ("Beto", "11922222222", true),
                ]),
            ))
            .await
            .unwrap();
        assert_eq!(response.total, 2);

        wait_finished(&f, response.dispatch_id).await;

        let texts: Vec<String> = f
            .transport
            .sends
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect();
        assert_eq!(texts, vec!["Oi Ana!", "Oi Beto!"]);

        let records = f
            .log_repo
            .list_by_dispatch(response.dispatch_id)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.state == DeliveryState::Sent));
    }

    #[tokio::test(start_paused = true)]
    async fn rerun_skips_addresses_already_delivered() {
        let f = fixture().await;
        connect_instance(&f).await;
        let campaign_id = Uuid::new_v4();
        f.log_repo
            .record(DeliveryRecord::new(
                Uuid::new_v4(),
                campaign_id,
                f.company_id,
                "11911111111".to_string(),
                "Ana".to_string(),
                DeliveryState::Sent,
                1,
            ))
            .await
            .unwrap();

        let response = f
            .usecase
            .execute(request(
                f.company_id,
                campaign_id,
                guests(&[
                    ("Ana", "11911111111", true),
                    ("Beto", "11922222222", true),
                ]),
            ))
            .await
            .unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.skipped_already_delivered, 1);

        wait_finished(&f, response.dispatch_id).await;
        let sends = f.transport.sends.lock().unwrap().clone();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].0, "11922222222");
    }

    #[tokio::test(start_paused = true)]
    async fn second_run_for_same_campaign_is_rejected_while_running() {
        let f = fixture().await;
        connect_instance(&f).await;
        let campaign_id = Uuid::new_v4();
        let first = f
            .usecase
            .execute(request(
                f.company_id,
                campaign_id,
                guests(&[
                    ("Ana", "11911111111", true),
                    ("Beto", "11922222222", true),
                ]),
            ))
            .await
            .unwrap();

        let second = f
            .usecase
            .execute(request(
                f.company_id,
                campaign_id,
                guests(&[("Caio", "11933333333", true)]),
            ))
            .await;
        assert!(matches!(second, Err(DomainError::AlreadyExists(_))));

        wait_finished(&f, first.dispatch_id).await;
    }

    #[tokio::test(start_paused = true)]
    async fn settings_fetch_failure_falls_back_to_defaults() {
        let f = fixture_with_settings(Arc::new(FailingSettingsRepository)).await;
        connect_instance(&f).await;
        let mut req = request(
            f.company_id,
            Uuid::new_v4(),
            guests(&[("Ana", "11911111111", true)]),
        );
        // no override: the rendered text must come from the fallback pool
        req.template_override = None;
        req.vars = TemplateVars::new()
            .with("company", "Buffet Alegria")
            .with("period", "dezembro")
            .with("link", "https://agenda.test")
            .with("notes", "");

        let response = f.usecase.execute(req).await.unwrap();
        wait_finished(&f, response.dispatch_id).await;

        let sends = f.transport.sends.lock().unwrap().clone();
        assert_eq!(sends.len(), 1);
        assert!(sends[0].1.contains("Ana"));
        assert!(!sends[0].1.contains('{'));
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::{
    models::delivery::DeliveryRecord,
    models::{CampaignSettings, ChannelInstance, DeliveryState, InstanceStatus},
    repositories::{DeliveryLogRepository, InstanceRepository, SettingsRepository},
};

pub type PgPool = Pool<Postgres>;

#[derive(Clone)]
pub struct PostgresDeliveryLogRepository {
    pool: PgPool,
}

impl PostgresDeliveryLogRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl DeliveryLogRepository for PostgresDeliveryLogRepository {
    async fn record(&self, record: DeliveryRecord) -> anyhow::Result<()> {
        let (state, reason) = delivery_state_to_fields(&record.state);
        sqlx::query(
            r#"
            INSERT INTO delivery_log (
                id, dispatch_id, campaign_id, company_id, address,
                recipient_name, state, state_reason, attempt, created_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            "#,
        )
        .bind(record.id)
        .bind(record.dispatch_id)
        .bind(record.campaign_id)
        .bind(record.company_id)
        .bind(&record.address)
        .bind(&record.recipient_name)
        .bind(state)
        .bind(reason)
        .bind(record.attempt as i32)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delivered_addresses(&self, campaign_id: Uuid) -> anyhow::Result<HashSet<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT address
            FROM delivery_log
            WHERE campaign_id = $1
              AND state = 'sent'
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(address,)| address).collect())
    }

    async fn list_by_dispatch(&self, dispatch_id: Uuid) -> anyhow::Result<Vec<DeliveryRecord>> {
        let rows = sqlx::query_as::<_, DeliveryRecordRow>(
            r#"
            SELECT id, dispatch_id, campaign_id, company_id, address,
                   recipient_name, state, state_reason, attempt, created_at
            FROM delivery_log
            WHERE dispatch_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(dispatch_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|row| row.try_into()).collect()
    }
}

#[derive(Clone)]
pub struct PostgresInstanceRepository {
    pool: PgPool,
}

impl PostgresInstanceRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl InstanceRepository for PostgresInstanceRepository {
    async fn upsert(&self, mut instance: ChannelInstance) -> anyhow::Result<ChannelInstance> {
        instance.updated_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        // a newly connected instance supersedes the previous one
        if instance.status == InstanceStatus::Connected {
            sqlx::query(
                r#"
                UPDATE channel_instances
                SET status = 'disconnected', updated_at = $2
                WHERE company_id = $1
                  AND id <> $3
                  AND status = 'connected'
                "#,
            )
            .bind(instance.company_id)
            .bind(instance.updated_at)
            .bind(instance.id)
            .execute(&mut *tx)
            .await?;
        }

        let record = sqlx::query_as::<_, ChannelInstanceRow>(
            r#"
            INSERT INTO channel_instances (id, company_id, name, status, created_at, updated_at)
            VALUES ($1,$2,$3,$4,$5,$6)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            RETURNING id, company_id, name, status, created_at, updated_at
            "#,
        )
        .bind(instance.id)
        .bind(instance.company_id)
        .bind(&instance.name)
        .bind(instance_status_to_str(instance.status))
        .bind(instance.created_at)
        .bind(instance.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        record.try_into()
    }

    async fn find_connected(&self, company_id: &Uuid) -> anyhow::Result<Option<ChannelInstance>> {
        let record = sqlx::query_as::<_, ChannelInstanceRow>(
            r#"
            SELECT id, company_id, name, status, created_at, updated_at
            FROM channel_instances
            WHERE company_id = $1
              AND status = 'connected'
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        record.map(|record| record.try_into()).transpose()
    }

    async fn list_by_company(&self, company_id: &Uuid) -> anyhow::Result<Vec<ChannelInstance>> {
        let rows = sqlx::query_as::<_, ChannelInstanceRow>(
            r#"
            SELECT id, company_id, name, status, created_at, updated_at
            FROM channel_instances
            WHERE company_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(|record| record.try_into()).collect()
    }
}

#[derive(Clone)]
pub struct PostgresSettingsRepository {
    pool: PgPool,
}

impl PostgresSettingsRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn get(&self, company_id: &Uuid) -> anyhow::Result<Option<CampaignSettings>> {
        let record = sqlx::query_as::<_, CampaignSettingsRow>(
            r#"
            SELECT company_id, templates, delay_min_secs, delay_max_secs,
                   group_delay_secs, updated_at
            FROM campaign_settings
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(CampaignSettings::from))
    }

    async fn upsert(&self, mut settings: CampaignSettings) -> anyhow::Result<()> {
        settings.updated_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO campaign_settings (
                company_id, templates, delay_min_secs, delay_max_secs,
                group_delay_secs, updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6)
            ON CONFLICT (company_id) DO UPDATE
            SET templates = EXCLUDED.templates,
                delay_min_secs = EXCLUDED.delay_min_secs,
                delay_max_secs = EXCLUDED.delay_max_secs,
                group_delay_secs = EXCLUDED.group_delay_secs,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(settings.company_id)
        .bind(&settings.templates)
        .bind(settings.delay_min_secs as i32)
        .bind(settings.delay_max_secs as i32)
        .bind(settings.group_delay_secs as i32)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(FromRow)]
struct DeliveryRecordRow {
    id: Uuid,
    dispatch_id: Uuid,
    campaign_id: Uuid,
    company_id: Uuid,
    address: String,
    recipient_name: String,
    state: String,
    state_reason: Option<String>,
    attempt: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<DeliveryRecordRow> for DeliveryRecord {
    type Error = anyhow::Error;

    fn try_from(value: DeliveryRecordRow) -> Result<Self, Self::Error> {
        let state = delivery_state_from_fields(&value.state, value.state_reason)?;
        Ok(Self {
            id: value.id,
            dispatch_id: value.dispatch_id,
            campaign_id: value.campaign_id,
            company_id: value.company_id,
            address: value.address,
            recipient_name: value.recipient_name,
            state,
            attempt: value.attempt as u32,
            created_at: value.created_at,
        })
    }
}

#[derive(FromRow)]
struct ChannelInstanceRow {
    id: Uuid,
    company_id: Uuid,
    name: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChannelInstanceRow> for ChannelInstance {
    type Error = anyhow::Error;

    fn try_from(value: ChannelInstanceRow) -> Result<Self, Self::Error> {
        let status = match value.status.as_str() {
            "connected" => InstanceStatus::Connected,
            "disconnected" => InstanceStatus::Disconnected,
            other => anyhow::bail!("unknown instance status {other}"),
        };
        Ok(Self {
            id: value.id,
            company_id: value.company_id,
            name: value.name,
            status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CampaignSettingsRow {
    company_id: Uuid,
    templates: Vec<String>,
    delay_min_secs: i32,
    delay_max_secs: i32,
    group_delay_secs: i32,
    updated_at: DateTime<Utc>,
}

impl From<CampaignSettingsRow> for CampaignSettings {
    fn from(value: CampaignSettingsRow) -> Self {
        Self {
            company_id: value.company_id,
            templates: value.templates,
            delay_min_secs: value.delay_min_secs.max(0) as u64,
            delay_max_secs: value.delay_max_secs.max(0) as u64,
            group_delay_secs: value.group_delay_secs.max(0) as u64,
            updated_at: value.updated_at,
        }
    }
}

fn instance_status_to_str(status: InstanceStatus) -> &'static str {
    match status {
        InstanceStatus::Connected => "connected",
        InstanceStatus::Disconnected => "disconnected",
    }
}

fn delivery_state_to_fields(state: &DeliveryState) -> (&'static str, Option<String>) {
    match state {
        DeliveryState::Pending => ("pending", None),
        DeliveryState::Sending => ("sending", None),
        DeliveryState::Sent => ("sent", None),
        DeliveryState::Failed { reason } => ("failed", Some(reason.clone())),
    }
}

fn delivery_state_from_fields(
    state: &str,
    reason: Option<String>,
) -> anyhow::Result<DeliveryState> {
    Ok(match state {
        "pending" => DeliveryState::Pending,
        "sending" => DeliveryState::Sending,
        "sent" => DeliveryState::Sent,
        "failed" => DeliveryState::Failed {
            reason: reason.unwrap_or_else(|| "failed".to_string()),
        },
        other => anyhow::bail!("unknown delivery state {other}"),
    })
}

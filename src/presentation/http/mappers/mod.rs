use crate::{
    domain::{
        events::DispatchSnapshot,
        models::delivery::DeliveryRecord,
        models::{CampaignSettings, ChannelInstance, DeliveryState, GroupCandidate},
    },
    presentation::{
        http::responses::{
            CampaignSettingsDto, DeliveryRecordDto, DispatchStatusDto, GroupDto, InstanceDto,
            RecipientProgressDto,
        },
        models::DeliveryStateDto,
    },
};

pub fn map_snapshot(snapshot: &DispatchSnapshot) -> DispatchStatusDto {
    let processed = snapshot.sent + snapshot.failed;
    let percent = if snapshot.total == 0 {
        100.0
    } else {
        processed as f32 / snapshot.total as f32 * 100.0
    };

    DispatchStatusDto {
        dispatch_id: snapshot.dispatch_id,
        campaign_id: snapshot.campaign_id,
        started_at: snapshot.started_at.to_rfc3339(),
        phase: snapshot.phase.into(),
        total: snapshot.total,
        current_index: snapshot.current_index,
        percent,
        waiting_secs: snapshot.waiting_secs,
        sent: snapshot.sent,
        failed: snapshot.failed,
        recipients: snapshot
            .recipients
            .iter()
            .map(|progress| RecipientProgressDto {
                name: progress.name.clone(),
                address: progress.address.clone(),
                state: DeliveryStateDto::from(&progress.state),
                error: extract_error(&progress.state),
            })
            .collect(),
    }
}

pub fn map_delivery(record: &DeliveryRecord) -> DeliveryRecordDto {
    DeliveryRecordDto {
        id: record.id,
        dispatch_id: record.dispatch_id,
        address: record.address.clone(),
        recipient_name: record.recipient_name.clone(),
        state: DeliveryStateDto::from(&record.state),
        error: extract_error(&record.state),
        attempt: record.attempt,
        created_at: record.created_at.to_rfc3339(),
    }
}

pub fn map_group(group: &GroupCandidate) -> GroupDto {
    GroupDto {
        group_id: group.group_id.clone(),
        name: group.name.clone(),
    }
}

pub fn map_instance(instance: &ChannelInstance) -> InstanceDto {
    InstanceDto {
        id: instance.id,
        name: instance.name.clone(),
        status: instance.status.into(),
        updated_at: instance.updated_at.to_rfc3339(),
    }
}

pub fn map_settings(settings: &CampaignSettings) -> CampaignSettingsDto {
    CampaignSettingsDto {
        templates: settings.templates.clone(),
        delay_min_secs: settings.delay_min_secs,
        delay_max_secs: settings.delay_max_secs,
        group_delay_secs: settings.group_delay_secs,
        updated_at: settings.updated_at.to_rfc3339(),
    }
}

fn extract_error(state: &DeliveryState) -> Option<String> {
    match state {
        DeliveryState::Failed { reason } => Some(reason.clone()),
        _ => None,
    }
}

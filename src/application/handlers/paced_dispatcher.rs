use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::application::services::delay::DelayStrategy;
use crate::application::services::progress::ProgressSink;
use crate::application::services::transport::TransportClient;
use crate::domain::models::delivery::DeliveryRecord;
use crate::domain::models::{
    ChannelInstance, DeliveryState, DispatchOutcome, DispatchSession, Recipient, TemplatePool,
    TemplateVars,
};
use crate::domain::repositories::DeliveryLogRepository;

/// Executes one dispatch session as a strictly sequential series of
/// sends, each gated by a randomized wait. One recipient in flight at a
/// time, never parallel. A single recipient failure never aborts the run;
/// cancellation is honored before each wait tick and before each send.
pub struct PacedDispatcher {
    transport: Arc<dyn TransportClient>,
    delay: Arc<dyn DelayStrategy>,
    log_repo: Arc<dyn DeliveryLogRepository>,
    sink: Arc<dyn ProgressSink>,
}

impl PacedDispatcher {
    pub fn new(
        transport: Arc<dyn TransportClient>,
        delay: Arc<dyn DelayStrategy>,
        log_repo: Arc<dyn DeliveryLogRepository>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            transport,
            delay,
            log_repo,
            sink,
        }
    }

    pub async fn run(
        &self,
        mut session: DispatchSession,
        instance: ChannelInstance,
        pool: TemplatePool,
        vars: TemplateVars,
        mut cancel: watch::Receiver<bool>,
    ) -> DispatchOutcome {
        self.warn_on_duplicates(&session);
        info!(
            dispatch = %session.id,
            campaign = %session.campaign_id,
            total = session.total(),
            "starting paced dispatch"
        );

        for index in 0..session.total() {
            if *cancel.borrow() {
                session.cancel();
                break;
            }

            // The first recipient goes out immediately; every later one
            // waits out the drawn delay first.
            if index > 0 {
                let wait = self.delay.next_delay(index);
                if !self.wait_between_sends(&session, wait, &mut cancel).await {
                    session.cancel();
                    break;
                }
            }

            if *cancel.borrow() {
                session.cancel();
                break;
            }

            let recipient = session.recipients()[index].clone();
            session.mark_sending(index);
            self.sink.publish(session.snapshot(None));

            let message = pool.render(index, &vars.clone().with("name", recipient.name.clone()));

            match self
                .transport
                .send_text(&instance, &recipient.address, &message)
                .await
            {
                Ok(()) => {
                    session.mark_sent(index);
                    self.persist(&session, &recipient, DeliveryState::Sent).await;
                }
                Err(err) => {
                    warn!(
                        dispatch = %session.id,
                        recipient = %recipient.address,
                        error = %err,
                        "send failed, continuing with next recipient"
                    );
                    let reason = err.to_string();
                    session.mark_failed(index, reason.clone());
                    self.persist(&session, &recipient, DeliveryState::Failed { reason })
                        .await;
                }
            }
            self.sink.publish(session.snapshot(None));
        }

        session.complete();
        let outcome = session.outcome();
        info!(
            dispatch = %session.id,
            phase = ?session.phase(),
            sent = outcome.sent,
            failed = outcome.failed,
            "dispatch finished"
        );
        self.sink.publish(session.snapshot(None));
        outcome
    }

    /// Per-second countdown so observers can show the remaining wait.
    /// Returns false when the run was cancelled mid-wait.
    async fn wait_between_sends(
        &self,
        session: &DispatchSession,
        wait: Duration,
        cancel: &mut watch::Receiver<bool>,
    ) -> bool {
        let mut remaining = wait;
        while !remaining.is_zero() {
            self.sink
                .publish(session.snapshot(Some(remaining.as_secs().max(1))));
            let step = remaining.min(Duration::from_secs(1));
            tokio::select! {
                _ = tokio::time::sleep(step) => {
                    remaining = remaining.saturating_sub(step);
                }
                changed = cancel.changed() => {
                    if changed.is_err() {
                        // Cancel source gone; finish the wait without it.
                        tokio::time::sleep(remaining).await;
                        return true;
                    }
                    if *cancel.borrow() {
                        return false;
                    }
                }
            }
        }
        true
    }

    async fn persist(
        &self,
        session: &DispatchSession,
        recipient: &Recipient,
        state: DeliveryState,
    ) {
        let record = DeliveryRecord::new(
            session.id,
            session.campaign_id,
            session.company_id,
            recipient.address.clone(),
            recipient.name.clone(),
            state,
            1,
        );
        if let Err(err) = self.log_repo.record(record).await {
            warn!(
                dispatch = %session.id,
                recipient = %recipient.address,
                error = %err,
                "failed to persist delivery record"
            );
        }
    }

    fn warn_on_duplicates(&self, session: &DispatchSession) {
        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = session
            .recipients()
            .iter()
            .filter(|recipient| !seen.insert(recipient.address.as_str()))
            .map(|recipient| recipient.address.as_str())
            .collect();
        if !duplicates.is_empty() {
            warn!(
                dispatch = %session.id,
                addresses = ?duplicates,
                "dispatch list contains duplicate destinations"
            );
        }
    }
}

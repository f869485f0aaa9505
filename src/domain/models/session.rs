use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recipient::{DeliveryState, Recipient};
use crate::domain::events::{DispatchSnapshot, RecipientProgress};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DispatchPhase {
    Running,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: u32,
    pub failed: u32,
}

/// Run-time state of one bulk-send operation. The recipient list is fixed
/// at creation; the dispatcher is the sole mutator, everything else reads
/// snapshots.
#[derive(Debug, Clone)]
pub struct DispatchSession {
    pub id: Uuid,
    pub company_id: Uuid,
    pub campaign_id: Uuid,
    pub started_at: DateTime<Utc>,
    recipients: Vec<Recipient>,
    states: Vec<DeliveryState>,
    current_index: usize,
    sent: u32,
    failed: u32,
    phase: DispatchPhase,
}

impl DispatchSession {
    pub fn new(company_id: Uuid, campaign_id: Uuid, recipients: Vec<Recipient>) -> Self {
        let states = vec![DeliveryState::Pending; recipients.len()];
        Self {
            id: Uuid::new_v4(),
            company_id,
            campaign_id,
            started_at: Utc::now(),
            recipients,
            states,
            current_index: 0,
            sent: 0,
            failed: 0,
            phase: DispatchPhase::Running,
        }
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn total(&self) -> usize {
        self.recipients.len()
    }

    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn state(&self, index: usize) -> Option<&DeliveryState> {
        self.states.get(index)
    }

    pub fn mark_sending(&mut self, index: usize) {
        if self.phase != DispatchPhase::Running {
            return;
        }
        if let Some(state) = self.states.get_mut(index) {
            if !state.is_terminal() {
                *state = DeliveryState::Sending;
                // current index never moves backwards
                self.current_index = self.current_index.max(index);
            }
        }
    }

    pub fn mark_sent(&mut self, index: usize) {
        if let Some(state) = self.states.get_mut(index) {
            if !state.is_terminal() {
                *state = DeliveryState::Sent;
                self.sent += 1;
            }
        }
    }

    pub fn mark_failed(&mut self, index: usize, reason: impl Into<String>) {
        if let Some(state) = self.states.get_mut(index) {
            if !state.is_terminal() {
                *state = DeliveryState::Failed {
                    reason: reason.into(),
                };
                self.failed += 1;
            }
        }
    }

    pub fn complete(&mut self) {
        if self.phase == DispatchPhase::Running {
            self.phase = DispatchPhase::Completed;
        }
    }

    pub fn cancel(&mut self) {
        if self.phase == DispatchPhase::Running {
            self.phase = DispatchPhase::Cancelled;
        }
    }

    pub fn outcome(&self) -> DispatchOutcome {
        DispatchOutcome {
            sent: self.sent,
            failed: self.failed,
        }
    }

    pub fn snapshot(&self, waiting_secs: Option<u64>) -> DispatchSnapshot {
        let recipients = self
            .recipients
            .iter()
            .zip(&self.states)
            .map(|(recipient, state)| RecipientProgress {
                name: recipient.name.clone(),
                address: recipient.address.clone(),
                state: state.clone(),
            })
            .collect();

        DispatchSnapshot {
            dispatch_id: self.id,
            campaign_id: self.campaign_id,
            started_at: self.started_at,
            phase: self.phase,
            total: self.total() as u32,
            current_index: self.current_index as u32,
            waiting_secs,
            sent: self.sent,
            failed: self.failed,
            recipients,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(names: &[&str]) -> DispatchSession {
        let recipients = names
            .iter()
            .map(|name| Recipient {
                name: name.to_string(),
                address: format!("5511{name}"),
            })
            .collect();
        DispatchSession::new(Uuid::new_v4(), Uuid::new_v4(), recipients)
    }

    #[test]
    fn terminal_states_never_regress() {
        let mut session = session_with(&["a", "b"]);
        session.mark_sending(0);
        session.mark_sent(0);
        session.mark_sending(0);
        session.mark_failed(0, "late failure");
        assert_eq!(session.state(0), Some(&DeliveryState::Sent));
        assert_eq!(session.outcome(), DispatchOutcome { sent: 1, failed: 0 });
    }

    #[test]
    fn current_index_is_monotonic() {
        let mut session = session_with(&["a", "b", "c"]);
        session.mark_sending(2);
        session.mark_sending(1);
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn tally_counts_sent_and_failed_once() {
        let mut session = session_with(&["a", "b", "c"]);
        session.mark_sending(0);
        session.mark_sent(0);
        session.mark_sending(1);
        session.mark_failed(1, "transport error");
        session.mark_failed(1, "again");
        session.mark_sending(2);
        session.mark_sent(2);
        session.complete();
        assert_eq!(session.outcome(), DispatchOutcome { sent: 2, failed: 1 });
        assert_eq!(session.phase(), DispatchPhase::Completed);
    }

    #[test]
    fn cancel_is_final() {
        let mut session = session_with(&["a"]);
        session.cancel();
        session.complete();
        assert_eq!(session.phase(), DispatchPhase::Cancelled);
    }

    #[test]
    fn snapshot_reflects_states() {
        let mut session = session_with(&["a", "b"]);
        session.mark_sending(0);
        session.mark_sent(0);
        let snapshot = session.snapshot(Some(7));
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.sent, 1);
        assert_eq!(snapshot.waiting_secs, Some(7));
        assert_eq!(snapshot.recipients[0].state, DeliveryState::Sent);
        assert_eq!(snapshot.recipients[1].state, DeliveryState::Pending);
    }
}

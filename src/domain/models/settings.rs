use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::template::TemplatePool;

/// Safety range for inter-send waits. Anything tighter risks the
/// channel's anti-spam detection, anything wider is operator error.
pub const DELAY_FLOOR_SECS: u64 = 5;
pub const DELAY_CEIL_SECS: u64 = 30;

/// Extra random slack added on top of the flat base for group sends.
pub const GROUP_JITTER_SECS: u64 = 3;

/// Bounds for the randomized wait between consecutive sends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelayPolicy {
    pub min_secs: u64,
    pub max_secs: u64,
    pub jitter_secs: u64,
}

impl DelayPolicy {
    /// Per-guest policy: both bounds clamped into the safety range, max
    /// forced to be >= min.
    pub fn for_guests(min_secs: u64, max_secs: u64) -> Self {
        let min = min_secs.clamp(DELAY_FLOOR_SECS, DELAY_CEIL_SECS);
        let max = max_secs.clamp(DELAY_FLOOR_SECS, DELAY_CEIL_SECS).max(min);
        Self {
            min_secs: min,
            max_secs: max,
            jitter_secs: 0,
        }
    }

    /// Group policy: flat base plus a small random jitter.
    pub fn for_groups(base_secs: u64) -> Self {
        let base = base_secs.clamp(DELAY_FLOOR_SECS, DELAY_CEIL_SECS);
        Self {
            min_secs: base,
            max_secs: base,
            jitter_secs: GROUP_JITTER_SECS,
        }
    }
}

const DEFAULT_TEMPLATES: &[&str] = &[
    "Oi {name}! Aqui é do {company}. Temos datas abertas para {period}. \
     Dá uma olhada: {link}",
    "Olá {name}, tudo bem? O {company} está com a agenda aberta para \
     {period}. Detalhes em {link}. {notes}",
];

const DEFAULT_GUEST_DELAY_MIN_SECS: u64 = 5;
const DEFAULT_GUEST_DELAY_MAX_SECS: u64 = 15;
const DEFAULT_GROUP_DELAY_SECS: u64 = 10;

/// Per-company broadcast configuration, loaded once before a session
/// starts. When the stored settings cannot be fetched the built-in
/// defaults below are used instead of failing the whole operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSettings {
    pub company_id: Uuid,
    pub templates: Vec<String>,
    pub delay_min_secs: u64,
    pub delay_max_secs: u64,
    pub group_delay_secs: u64,
    pub updated_at: DateTime<Utc>,
}

impl CampaignSettings {
    pub fn fallback(company_id: Uuid) -> Self {
        Self {
            company_id,
            templates: DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            delay_min_secs: DEFAULT_GUEST_DELAY_MIN_SECS,
            delay_max_secs: DEFAULT_GUEST_DELAY_MAX_SECS,
            group_delay_secs: DEFAULT_GROUP_DELAY_SECS,
            updated_at: Utc::now(),
        }
    }

    /// Stored variants with blank entries dropped; falls back to the
    /// defaults when nothing usable remains.
    pub fn template_pool(&self) -> TemplatePool {
        let variants: Vec<String> = self
            .templates
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();
        if variants.is_empty() {
            TemplatePool::new(DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect())
        } else {
            TemplatePool::new(variants)
        }
    }

    pub fn guest_delay(&self) -> DelayPolicy {
        DelayPolicy::for_guests(self.delay_min_secs, self.delay_max_secs)
    }

    pub fn group_delay(&self) -> DelayPolicy {
        DelayPolicy::for_groups(self.group_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_bounds_are_clamped_into_safety_range() {
        let policy = DelayPolicy::for_guests(1, 90);
        assert_eq!(policy.min_secs, DELAY_FLOOR_SECS);
        assert_eq!(policy.max_secs, DELAY_CEIL_SECS);
    }

    #[test]
    fn max_never_drops_below_min() {
        let policy = DelayPolicy::for_guests(20, 8);
        assert_eq!(policy.min_secs, 20);
        assert_eq!(policy.max_secs, 20);
    }

    #[test]
    fn group_policy_is_flat_base_with_jitter() {
        let policy = DelayPolicy::for_groups(10);
        assert_eq!(policy.min_secs, 10);
        assert_eq!(policy.max_secs, 10);
        assert_eq!(policy.jitter_secs, GROUP_JITTER_SECS);
    }

    #[test]
    fn fallback_settings_have_usable_templates() {
        let settings = CampaignSettings::fallback(Uuid::new_v4());
        assert!(!settings.template_pool().is_empty());
    }

    #[test]
    fn blank_stored_templates_fall_back_to_defaults() {
        let mut settings = CampaignSettings::fallback(Uuid::new_v4());
        settings.templates = vec!["   ".to_string()];
        assert!(!settings.template_pool().is_empty());
    }
}

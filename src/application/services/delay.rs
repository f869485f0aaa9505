use std::time::Duration;

use rand::Rng;

use crate::domain::models::DelayPolicy;

/// Draws the wait inserted before each non-first send. Behind a trait so
/// tests can substitute deterministic delays.
pub trait DelayStrategy: Send + Sync {
    fn next_delay(&self, index: usize) -> Duration;
}

/// Production strategy: uniform draw from [min, max] plus a uniform
/// jitter from [0, jitter].
pub struct RandomDelay {
    policy: DelayPolicy,
}

impl RandomDelay {
    pub fn new(policy: DelayPolicy) -> Self {
        Self { policy }
    }
}

impl DelayStrategy for RandomDelay {
    fn next_delay(&self, _index: usize) -> Duration {
        let mut rng = rand::thread_rng();
        let base = rng.gen_range(self.policy.min_secs..=self.policy.max_secs);
        let jitter = if self.policy.jitter_secs > 0 {
            rng.gen_range(0..=self.policy.jitter_secs)
        } else {
            0
        };
        Duration::from_secs(base + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_stays_within_policy_bounds() {
        let strategy = RandomDelay::new(DelayPolicy::for_guests(5, 12));
        for index in 0..200 {
            let delay = strategy.next_delay(index).as_secs();
            assert!((5..=12).contains(&delay), "drew {delay}s");
        }
    }

    #[test]
    fn group_draw_includes_jitter_bound() {
        let strategy = RandomDelay::new(DelayPolicy::for_groups(10));
        for index in 0..200 {
            let delay = strategy.next_delay(index).as_secs();
            assert!((10..=13).contains(&delay), "drew {delay}s");
        }
    }

    #[test]
    fn degenerate_window_is_deterministic() {
        let strategy = RandomDelay::new(DelayPolicy::for_guests(5, 5));
        assert_eq!(strategy.next_delay(0), Duration::from_secs(5));
        assert_eq!(strategy.next_delay(9), Duration::from_secs(5));
    }
}

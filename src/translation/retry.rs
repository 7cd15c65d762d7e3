/*!
 * Retry policy for batch requests.
 *
 * A chunk gets a fixed number of attempts with a fixed pause between
 * them. When every attempt fails the policy decides what happens to the
 * chunk; the only supported action is to fall back to the source text.
 */

use std::time::Duration;

use crate::app_config::RetryConfig;

/// What to do with a chunk after its last failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhaustionAction {
    /// Keep the untranslated source text for every unit in the chunk
    #[default]
    FallbackToSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per chunk, including the first
    pub max_attempts: u32,
    /// Pause between two attempts
    pub backoff: Duration,
    pub on_exhaustion: ExhaustionAction,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(1),
            on_exhaustion: ExhaustionAction::FallbackToSource,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            on_exhaustion: ExhaustionAction::FallbackToSource,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.backoff_ms))
    }

    /// Whether another attempt may start after `attempts_made` failures
    pub fn allows_attempt(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Pause to observe before the attempt numbered `attempt` (zero-based)
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || self.backoff.is_zero() {
            None
        } else {
            Some(self.backoff)
        }
    }
}

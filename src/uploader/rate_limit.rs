//! Adaptive rate limiting shared across upload workers
//!
//! Implements delay-based throttling that relaxes under sustained success
//! and backs off sharply on explicit rate-limit signals (HTTP 429 semantics).

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Consecutive successes required before the delay is relaxed
const RELAX_AFTER_SUCCESSES: u32 = 3;

/// Multiplier applied to the delay on each relax step
const RELAX_FACTOR: f64 = 0.9;

/// Slack added on top of a server-provided retry-after hint
const RETRY_AFTER_SLACK: Duration = Duration::from_secs(1);

/// Adaptive throttle enforcing a minimum interval between outgoing calls.
///
/// One instance is shared by all workers of a run. `wait` makes an atomic
/// check-and-reserve decision under a short-lived lock and then sleeps with
/// the lock released, so unrelated workers are never serialized by each
/// other's waits.
pub struct RateLimiter {
    min_delay: Duration,
    max_delay: Duration,
    state: Mutex<LimiterState>,
}

#[derive(Debug)]
struct LimiterState {
    current_delay: Duration,
    consecutive_successes: u32,
    /// Instant reserved for the most recent permitted call
    last_slot: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter starting at `initial_delay`, which is also the floor
    /// the delay can relax back down to.
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay: initial_delay,
            max_delay: max_delay.max(initial_delay),
            state: Mutex::new(LimiterState {
                current_delay: initial_delay,
                consecutive_successes: 0,
                last_slot: None,
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Block until at least the current delay has elapsed since the last
    /// permitted call, then record this call's slot.
    ///
    /// The slot reservation happens atomically under the lock; the sleep
    /// itself holds no lock, so concurrent callers queue up distinct slots
    /// rather than waiting on each other.
    pub async fn wait(&self) {
        let slot = {
            let mut state = self.state();
            let now = Instant::now();
            let slot = match state.last_slot {
                Some(last) => now.max(last + state.current_delay),
                None => now,
            };
            state.last_slot = Some(slot);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }

    /// Record a successful call. After three consecutive successes the delay
    /// relaxes by 10%, floored at the initial delay.
    pub fn on_success(&self) {
        let mut state = self.state();
        state.consecutive_successes += 1;
        if state.consecutive_successes >= RELAX_AFTER_SUCCESSES {
            let relaxed = state.current_delay.mul_f64(RELAX_FACTOR).max(self.min_delay);
            if relaxed < state.current_delay {
                debug!(
                    delay_ms = relaxed.as_millis(),
                    "Sustained success - relaxing rate limit delay"
                );
            }
            state.current_delay = relaxed;
            state.consecutive_successes = 0;
        }
    }

    /// Record an explicit rate-limit signal. With a retry-after hint the
    /// delay jumps to hint + 1s; without one it doubles. Either way it is
    /// capped at the maximum and the success streak resets.
    pub fn on_rate_limited(&self, retry_after: Option<Duration>) {
        let mut state = self.state();
        state.current_delay = match retry_after {
            Some(hint) => (hint + RETRY_AFTER_SLACK).min(self.max_delay),
            None => (state.current_delay * 2).min(self.max_delay),
        };
        state.consecutive_successes = 0;
        warn!(
            delay_ms = state.current_delay.as_millis(),
            hinted = retry_after.is_some(),
            "Rate limited - increased delay"
        );
    }

    /// Record a generic failure. Resets the success streak without touching
    /// the delay.
    pub fn on_error(&self) {
        self.state().consecutive_successes = 0;
    }

    /// Current inter-call delay
    pub fn current_delay(&self) -> Duration {
        self.state().current_delay
    }

    /// Floor the delay relaxes down to
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Ceiling the delay backs off up to
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("min_delay", &self.min_delay)
            .field("max_delay", &self.max_delay)
            .field("current_delay", &self.current_delay())
            .finish()
    }
}

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// Counter state for one identifier's current window.
#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u32,
    reset_at: Instant,
}

impl WindowRecord {
    fn fresh(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            reset_at: now + window,
        }
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        /// Requests still permitted in the current window.
        remaining: u32,
    },
    Limited {
        /// Time until the current window resets.
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Fixed-window request counter keyed by caller identifier.
///
/// Each identifier gets a window starting at its first request; the counter
/// resets once the window has elapsed. Bursts straddling a boundary can reach
/// twice the nominal rate.
///
/// State is process-local: separate instances enforce separate quotas.
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    records: DashMap<String, WindowRecord>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request for `identifier`; returns whether it is within quota.
    pub fn allow(&self, identifier: &str, max_requests: u32, window: Duration) -> bool {
        self.check(identifier, max_requests, window).is_allowed()
    }

    /// Count a request for `identifier` and report the decision.
    ///
    /// Denied requests are not counted.
    pub fn check(&self, identifier: &str, max_requests: u32, window: Duration) -> RateLimitDecision {
        self.check_at(identifier, max_requests, window, Instant::now())
    }

    fn check_at(
        &self,
        identifier: &str,
        max_requests: u32,
        window: Duration,
        now: Instant,
    ) -> RateLimitDecision {
        match self.records.entry(identifier.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(WindowRecord::fresh(now, window));
                RateLimitDecision::Allowed {
                    remaining: max_requests.saturating_sub(1),
                }
            }
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                if now > record.reset_at {
                    *record = WindowRecord::fresh(now, window);
                    RateLimitDecision::Allowed {
                        remaining: max_requests.saturating_sub(1),
                    }
                } else if record.count >= max_requests {
                    RateLimitDecision::Limited {
                        retry_after: record.reset_at.saturating_duration_since(now),
                    }
                } else {
                    record.count += 1;
                    RateLimitDecision::Allowed {
                        remaining: max_requests - record.count,
                    }
                }
            }
        }
    }

    /// Drop records whose window has elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| now <= record.reset_at);
        before.saturating_sub(self.records.len())
    }

    /// Number of identifiers currently tracked.
    pub fn tracked(&self) -> usize {
        self.records.len()
    }

    /// Spawn a background task that purges elapsed windows every `every`.
    ///
    /// The task exits once the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                let removed = limiter.purge_expired();
                if removed > 0 {
                    debug!(removed, "Purged elapsed rate limit windows");
                }
            }
        })
    }
}

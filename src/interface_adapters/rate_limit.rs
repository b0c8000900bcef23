use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::entities::{EndpointClass, RateDecision};
use crate::domain::ports::RateLimitStore;

// One counter per (endpoint class, client identifier) window.
#[derive(Clone, Copy, Debug)]
struct WindowCounter {
    count: u32,
    reset_at_ms: u64,
}

// Fixed-window counters behind a single async lock, so check-then-increment
// is one indivisible step under concurrent requests.
//
// Fixed windows trade precision for simplicity: bursts straddling a window
// boundary can admit up to 2x the ceiling across two adjacent windows.
// Counters are process-local; multiple gateway instances get per-instance
// limits unless a shared RateLimitStore is injected instead.
#[derive(Clone)]
pub struct InMemoryRateLimitStore {
    windows: Arc<Mutex<HashMap<(EndpointClass, String), WindowCounter>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // Drops expired counters so sustained traffic from many distinct clients
    // cannot grow the map without bound. Called from a periodic task.
    pub async fn sweep(&self, now_ms: u64) {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, counter| counter.reset_at_ms > now_ms);
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "swept rate-limit windows");
        }
    }
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn check(
        &self,
        class: EndpointClass,
        identifier: &str,
        now_ms: u64,
    ) -> Result<RateDecision, String> {
        let policy = class.policy();
        let mut windows = self.windows.lock().await;
        let counter = windows
            .entry((class, identifier.to_string()))
            .or_insert(WindowCounter {
                count: 0,
                reset_at_ms: now_ms + policy.window_ms,
            });

        // Fresh window once the old one has elapsed.
        if now_ms >= counter.reset_at_ms {
            counter.count = 0;
            counter.reset_at_ms = now_ms + policy.window_ms;
        }

        if counter.count >= policy.max_requests {
            // Rejected attempts do not consume the window.
            return Ok(RateDecision {
                allowed: false,
                remaining: 0,
                reset_at_ms: counter.reset_at_ms,
            });
        }

        counter.count += 1;
        Ok(RateDecision {
            allowed: true,
            remaining: policy.max_requests - counter.count,
            reset_at_ms: counter.reset_at_ms,
        })
    }
}

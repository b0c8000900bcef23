use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::ports::{Clock, GuestStore, Notifier, RateLimitStore};
use crate::domain::token::TokenSigner;

// Application state shared across handlers. Adapters live behind trait
// objects so route tests can swap in recording fakes.
#[derive(Clone)]
pub struct AppState {
    pub clock: Arc<dyn Clock>,
    pub rate_store: Arc<dyn RateLimitStore>,
    pub store: Arc<dyn GuestStore>,
    pub notifier: Arc<dyn Notifier>,
    pub signer: TokenSigner,
}

// System clock adapter used by the gateway pipelines.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::{
    EndpointClass, NewPaymentCharge, PaymentAck, Priority, RateDecision, RequestAck,
    SessionLookup, StaffNotification,
};
use crate::domain::ports::{Clock, GuestStore, Notifier, RateLimitStore};
use crate::domain::token::{TokenConfig, TokenSigner};

pub(crate) const TEST_NOW_MS: u64 = 1_700_000_000_000;
pub(crate) const TEST_TTL_MS: u64 = 24 * 60 * 60 * 1000;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_millis(&self) -> u64 {
        self.0
    }
}

pub(crate) fn test_signer() -> TokenSigner {
    TokenSigner::new(TokenConfig {
        secret: "test-secret".to_string(),
        ttl_ms: TEST_TTL_MS,
    })
}

// Rate store fake returning a scripted decision and recording the keys it saw.
#[derive(Clone)]
pub(crate) struct ScriptedRateStore {
    pub(crate) decision: RateDecision,
    pub(crate) seen: Arc<Mutex<Vec<(EndpointClass, String)>>>,
    pub(crate) should_fail: bool,
}

impl ScriptedRateStore {
    pub(crate) fn allowing() -> Self {
        Self {
            decision: RateDecision {
                allowed: true,
                remaining: 9,
                reset_at_ms: TEST_NOW_MS + 60_000,
            },
            seen: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    pub(crate) fn rejecting(reset_at_ms: u64) -> Self {
        Self {
            decision: RateDecision {
                allowed: false,
                remaining: 0,
                reset_at_ms,
            },
            seen: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }
}

#[async_trait]
impl RateLimitStore for ScriptedRateStore {
    async fn check(
        &self,
        class: EndpointClass,
        identifier: &str,
        _now_ms: u64,
    ) -> Result<RateDecision, String> {
        if self.should_fail {
            return Err("rate store unavailable".to_string());
        }
        let mut guard = self.seen.lock().expect("seen mutex poisoned");
        guard.push((class, identifier.to_string()));
        Ok(self.decision)
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct StoreFailures {
    pub validate: bool,
    pub create_request: bool,
    pub create_payment: bool,
    pub reads: bool,
}

// Captured arguments of the last create_request call.
#[derive(Clone, Debug)]
pub(crate) struct CapturedRequest {
    pub session_id: String,
    pub request_type: String,
    pub request_data: Value,
    pub priority: Priority,
}

// Recording fake for the external store.
#[derive(Clone)]
pub(crate) struct RecordingStore {
    pub(crate) lookup: Arc<Mutex<SessionLookup>>,
    pub(crate) validate_calls: Arc<Mutex<u32>>,
    pub(crate) requests: Arc<Mutex<Vec<CapturedRequest>>>,
    pub(crate) payments: Arc<Mutex<Vec<NewPaymentCharge>>>,
    pub(crate) read_result: Arc<Mutex<Option<Value>>>,
    pub(crate) failures: StoreFailures,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            lookup: Arc::new(Mutex::new(valid_lookup())),
            validate_calls: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            payments: Arc::new(Mutex::new(Vec::new())),
            read_result: Arc::new(Mutex::new(None)),
            failures: StoreFailures::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: StoreFailures) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn with_lookup(self, lookup: SessionLookup) -> Self {
        *self.lookup.lock().expect("lookup mutex poisoned") = lookup;
        self
    }

    pub(crate) fn with_read_result(self, value: Value) -> Self {
        *self.read_result.lock().expect("read mutex poisoned") = Some(value);
        self
    }
}

pub(crate) fn valid_lookup() -> SessionLookup {
    SessionLookup {
        is_valid: true,
        session_id: Some("session-1".to_string()),
        tenant_id: Some("tenant-1".to_string()),
        qr_code_id: Some("qr-1".to_string()),
        hotel_name: Some("Harborview Hotel".to_string()),
        room_number: Some("204".to_string()),
        services: Some(vec!["housekeeping".to_string(), "room_service".to_string()]),
        expires_at: Some("2026-09-01T12:00:00Z".to_string()),
    }
}

pub(crate) fn invalid_lookup() -> SessionLookup {
    SessionLookup {
        is_valid: false,
        ..SessionLookup::default()
    }
}

#[async_trait]
impl GuestStore for RecordingStore {
    async fn validate_and_create_session(
        &self,
        _qr_token: &str,
        _device_info: Option<Value>,
    ) -> Result<SessionLookup, String> {
        *self.validate_calls.lock().expect("call counter poisoned") += 1;
        if self.failures.validate {
            return Err("validate failed".to_string());
        }
        Ok(self.lookup.lock().expect("lookup mutex poisoned").clone())
    }

    async fn create_request(
        &self,
        session_id: &str,
        request_type: &str,
        request_data: Value,
        priority: Priority,
    ) -> Result<RequestAck, String> {
        if self.failures.create_request {
            return Err("create_request failed".to_string());
        }
        let mut guard = self.requests.lock().expect("requests mutex poisoned");
        guard.push(CapturedRequest {
            session_id: session_id.to_string(),
            request_type: request_type.to_string(),
            request_data,
            priority,
        });
        Ok(RequestAck {
            request_id: "request-1".to_string(),
            tracking_number: "TRK-0001".to_string(),
            created_at: "2026-08-30T10:00:00Z".to_string(),
        })
    }

    async fn create_payment(&self, charge: NewPaymentCharge) -> Result<PaymentAck, String> {
        if self.failures.create_payment {
            return Err("create_payment failed".to_string());
        }
        let mut guard = self.payments.lock().expect("payments mutex poisoned");
        guard.push(charge);
        Ok(PaymentAck {
            payment_id: "payment-1".to_string(),
            status: "pending".to_string(),
            is_verified: false,
        })
    }

    async fn get_request(&self, _request_id: &str) -> Result<Option<Value>, String> {
        if self.failures.reads {
            return Err("get_request failed".to_string());
        }
        Ok(self.read_result.lock().expect("read mutex poisoned").clone())
    }

    async fn session_requests(&self, _session_id: &str) -> Result<Option<Value>, String> {
        if self.failures.reads {
            return Err("session_requests failed".to_string());
        }
        Ok(self.read_result.lock().expect("read mutex poisoned").clone())
    }

    async fn qr_analytics(&self, _qr_code_id: &str) -> Result<Option<Value>, String> {
        if self.failures.reads {
            return Err("qr_analytics failed".to_string());
        }
        Ok(self.read_result.lock().expect("read mutex poisoned").clone())
    }
}

// Notifier fake recording every dispatched notification.
#[derive(Clone)]
pub(crate) struct RecordingNotifier {
    pub(crate) sent: Arc<Mutex<Vec<StaffNotification>>>,
}

impl RecordingNotifier {
    pub(crate) fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: StaffNotification) {
        let mut guard = self.sent.lock().expect("sent mutex poisoned");
        guard.push(notification);
    }
}

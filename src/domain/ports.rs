use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::{
    EndpointClass, NewPaymentCharge, PaymentAck, Priority, RateDecision, RequestAck,
    SessionLookup, StaffNotification,
};

// Port for retrieving the current time, epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_epoch_millis(&self) -> u64;
}

// Port for rate-limit counters keyed by (endpoint class, client identifier).
// Injected so single-instance deployments use the in-memory store and
// multi-instance deployments can plug in a shared counter service.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn check(
        &self,
        class: EndpointClass,
        identifier: &str,
        now_ms: u64,
    ) -> Result<RateDecision, String>;
}

// Port for the external session/request store. The gateway only ever reaches
// the relational layer through these opaque procedures.
#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn validate_and_create_session(
        &self,
        qr_token: &str,
        device_info: Option<Value>,
    ) -> Result<SessionLookup, String>;

    async fn create_request(
        &self,
        session_id: &str,
        request_type: &str,
        request_data: Value,
        priority: Priority,
    ) -> Result<RequestAck, String>;

    async fn create_payment(&self, charge: NewPaymentCharge) -> Result<PaymentAck, String>;

    async fn get_request(&self, request_id: &str) -> Result<Option<Value>, String>;

    async fn session_requests(&self, session_id: &str) -> Result<Option<Value>, String>;

    async fn qr_analytics(&self, qr_code_id: &str) -> Result<Option<Value>, String>;
}

// Port for staff notifications. Dispatch-and-discard: implementations must
// never surface failure to the caller, only log it.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: StaffNotification);
}

// Forwarding impls so use cases stay generic while AppState holds trait
// objects behind Arc.

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now_epoch_millis(&self) -> u64 {
        (**self).now_epoch_millis()
    }
}

#[async_trait]
impl<T: RateLimitStore + ?Sized> RateLimitStore for Arc<T> {
    async fn check(
        &self,
        class: EndpointClass,
        identifier: &str,
        now_ms: u64,
    ) -> Result<RateDecision, String> {
        (**self).check(class, identifier, now_ms).await
    }
}

#[async_trait]
impl<T: GuestStore + ?Sized> GuestStore for Arc<T> {
    async fn validate_and_create_session(
        &self,
        qr_token: &str,
        device_info: Option<Value>,
    ) -> Result<SessionLookup, String> {
        (**self)
            .validate_and_create_session(qr_token, device_info)
            .await
    }

    async fn create_request(
        &self,
        session_id: &str,
        request_type: &str,
        request_data: Value,
        priority: Priority,
    ) -> Result<RequestAck, String> {
        (**self)
            .create_request(session_id, request_type, request_data, priority)
            .await
    }

    async fn create_payment(&self, charge: NewPaymentCharge) -> Result<PaymentAck, String> {
        (**self).create_payment(charge).await
    }

    async fn get_request(&self, request_id: &str) -> Result<Option<Value>, String> {
        (**self).get_request(request_id).await
    }

    async fn session_requests(&self, session_id: &str) -> Result<Option<Value>, String> {
        (**self).session_requests(session_id).await
    }

    async fn qr_analytics(&self, qr_code_id: &str) -> Result<Option<Value>, String> {
        (**self).qr_analytics(qr_code_id).await
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: StaffNotification) {
        (**self).notify(notification);
    }
}

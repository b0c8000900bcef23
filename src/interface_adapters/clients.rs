use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::warn;

use crate::domain::entities::{
    NewPaymentCharge, PaymentAck, Priority, RequestAck, SessionLookup, StaffNotification,
};
use crate::domain::ports::{GuestStore, Notifier};

// The clients defined here are thin reqwest wrappers for the external
// session/request store and the staff-notification pipeline.

// HTTP adapter for the store's opaque server-side procedures. Every call is
// bounded by an explicit timeout so a stuck store surfaces as a clear failure
// instead of a hang.
#[derive(Clone)]
pub struct HttpGuestStore {
    http: Client,
    base_url: String,
}

impl HttpGuestStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, String> {
        let url = format!("{}{path}", self.base_url);
        let res = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| format!("store transport error: {err}"))?;

        let status = res.status();
        if !status.is_success() {
            return Err(format!("store upstream error {status}"));
        }

        res.json::<Value>()
            .await
            .map_err(|err| format!("store response decode error: {err}"))
    }

    // GET returning None on upstream 404 so callers can map missing resources.
    async fn get(&self, path: &str) -> Result<Option<Value>, String> {
        let url = format!("{}{path}", self.base_url);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| format!("store transport error: {err}"))?;

        let status = res.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(format!("store upstream error {status}"));
        }

        res.json::<Value>()
            .await
            .map(Some)
            .map_err(|err| format!("store response decode error: {err}"))
    }
}

#[async_trait]
impl GuestStore for HttpGuestStore {
    async fn validate_and_create_session(
        &self,
        qr_token: &str,
        device_info: Option<Value>,
    ) -> Result<SessionLookup, String> {
        let body = json!({
            "qrToken": qr_token,
            "deviceInfo": device_info,
        });
        let value = self.post("/rpc/validate-qr-and-create-session", body).await?;
        serde_json::from_value(value).map_err(|err| format!("store session decode error: {err}"))
    }

    async fn create_request(
        &self,
        session_id: &str,
        request_type: &str,
        request_data: Value,
        priority: Priority,
    ) -> Result<RequestAck, String> {
        let body = json!({
            "sessionId": session_id,
            "requestType": request_type,
            "requestData": request_data,
            "priority": priority.as_str(),
        });
        let value = self.post("/rpc/create-unified-qr-request", body).await?;
        serde_json::from_value(value).map_err(|err| format!("store ack decode error: {err}"))
    }

    async fn create_payment(&self, charge: NewPaymentCharge) -> Result<PaymentAck, String> {
        let body =
            serde_json::to_value(&charge).map_err(|err| format!("charge encode error: {err}"))?;
        let value = self.post("/rpc/create-payment-charge", body).await?;
        serde_json::from_value(value).map_err(|err| format!("store ack decode error: {err}"))
    }

    async fn get_request(&self, request_id: &str) -> Result<Option<Value>, String> {
        self.get(&format!("/requests/{request_id}")).await
    }

    async fn session_requests(&self, session_id: &str) -> Result<Option<Value>, String> {
        self.get(&format!("/sessions/{session_id}/requests")).await
    }

    async fn qr_analytics(&self, qr_code_id: &str) -> Result<Option<Value>, String> {
        self.get(&format!("/analytics/qr/{qr_code_id}")).await
    }
}

// Fire-and-forget staff notifier. notify() spawns the POST and returns
// immediately; delivery failure is logged and discarded by construction, so
// it can never leak into the success path of a guest request.
#[derive(Clone)]
pub struct HttpNotifier {
    http: Client,
    base_url: String,
}

impl HttpNotifier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, notification: StaffNotification) {
        let http = self.http.clone();
        let url = format!("{}/notifications", self.base_url);
        tokio::spawn(async move {
            let result = http.post(url).json(&notification).send().await;
            match result {
                Ok(res) if !res.status().is_success() => {
                    warn!(status = %res.status(), "staff notification rejected");
                }
                Err(err) => {
                    warn!(error = %err, "staff notification dispatch failed");
                }
                Ok(_) => {}
            }
        });
    }
}

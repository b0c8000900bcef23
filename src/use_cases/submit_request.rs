use serde_json::json;
use tracing::warn;

use crate::domain::entities::{EndpointClass, Priority, RequestAck, StaffNotification};
use crate::domain::errors::GatewayError;
use crate::domain::ports::{Clock, GuestStore, Notifier, RateLimitStore};
use crate::domain::token::TokenSigner;
use crate::interface_adapters::protocol::SubmitRequestRequest;
use crate::use_cases::sanitize::{FREE_TEXT_MAX_CHARS, SHORT_FIELD_MAX_CHARS, sanitize_json, sanitize_string};
use crate::use_cases::validate_qr::gate_rate_limit;

// Accepts a service request bound to a session and pages the relevant staff
// department best-effort. Pipeline: rate gate, token check, shape check,
// sanitize, store call, notify.
pub struct SubmitRequestUseCase<C, R, S, N> {
    pub clock: C,
    pub rate_store: R,
    pub store: S,
    pub notifier: N,
    pub signer: TokenSigner,
}

impl<C, R, S, N> SubmitRequestUseCase<C, R, S, N>
where
    C: Clock,
    R: RateLimitStore,
    S: GuestStore,
    N: Notifier,
{
    pub async fn execute(
        &self,
        client_id: &str,
        session_token: Option<&str>,
        payload: SubmitRequestRequest,
    ) -> Result<RequestAck, GatewayError> {
        let now_ms = self.clock.now_epoch_millis();
        gate_rate_limit(&self.rate_store, EndpointClass::Request, client_id, now_ms).await?;

        // Stateless trust: a supplied token is verified against the signing
        // secret and its own expiry only. Deliberately no session-store
        // lookup here; do not "fix" this into a per-request revalidation.
        let claims = match session_token {
            Some(token) => Some(
                self.signer
                    .verify(token, now_ms)
                    .map_err(|_| GatewayError::Unauthorized)?,
            ),
            None => None,
        };

        let priority = validate_payload(&payload)?;

        let request_type = sanitize_string(payload.request_type.trim(), SHORT_FIELD_MAX_CHARS);
        let request_data = sanitize_json(
            payload.request_data.unwrap_or_else(|| json!({})),
            FREE_TEXT_MAX_CHARS,
        );

        let ack = self
            .store
            .create_request(
                payload.session_id.trim(),
                &request_type,
                request_data.clone(),
                priority,
            )
            .await
            .map_err(|err| {
                warn!(error = %err, "request store call failed");
                GatewayError::Upstream
            })?;

        // Staff paging is best-effort; a guest request must succeed even when
        // notification delivery does not.
        self.notifier.notify(StaffNotification {
            tenant_id: claims
                .as_ref()
                .map(|c| c.tenant_id.clone())
                .unwrap_or_default(),
            title: format!("New guest request: {request_type}"),
            message: format!("Tracking {}", ack.tracking_number),
            priority,
            department: department_for(&request_type).to_string(),
            reference_id: ack.request_id.clone(),
            metadata: json!({
                "sessionId": payload.session_id.trim(),
                "requestType": request_type,
                "requestData": request_data,
            }),
        });

        Ok(ack)
    }
}

fn validate_payload(payload: &SubmitRequestRequest) -> Result<Priority, GatewayError> {
    let mut details = Vec::new();

    if payload.session_id.trim().is_empty() {
        details.push("sessionId is required".to_string());
    }
    if payload.request_type.trim().is_empty() {
        details.push("requestType is required".to_string());
    }

    let priority = match payload.priority.as_deref() {
        None => Priority::Normal,
        Some(raw) => match Priority::parse(raw) {
            Some(priority) => priority,
            None => {
                details.push("priority must be one of low, normal, high, urgent".to_string());
                Priority::Normal
            }
        },
    };

    if details.is_empty() {
        Ok(priority)
    } else {
        Err(GatewayError::Validation(details))
    }
}

fn department_for(request_type: &str) -> &'static str {
    match request_type {
        "housekeeping" | "cleaning" => "housekeeping",
        "maintenance" => "maintenance",
        "room_service" | "food_order" => "kitchen",
        _ => "front_desk",
    }
}

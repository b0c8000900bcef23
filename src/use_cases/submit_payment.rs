use serde_json::json;
use tracing::warn;

use crate::domain::entities::{
    EndpointClass, NewPaymentCharge, PaymentAck, PaymentMethod, Priority, StaffNotification,
};
use crate::domain::errors::GatewayError;
use crate::domain::ports::{Clock, GuestStore, Notifier, RateLimitStore};
use crate::domain::token::TokenSigner;
use crate::interface_adapters::protocol::PaymentChargeRequest;
use crate::use_cases::sanitize::{SHORT_FIELD_MAX_CHARS, sanitize_string};
use crate::use_cases::validate_qr::gate_rate_limit;

// Currency-agnostic sanity cap; anything above this is implausible for a
// guest-facing charge and rejected before the store is involved.
const MAX_AMOUNT: f64 = 1_000_000.0;

// Submits a payment charge. Charges always enter the store pending and
// unverified; a human accounts workflow verifies them later. Requires a valid
// session token.
pub struct SubmitPaymentUseCase<C, R, S, N> {
    pub clock: C,
    pub rate_store: R,
    pub store: S,
    pub notifier: N,
    pub signer: TokenSigner,
}

impl<C, R, S, N> SubmitPaymentUseCase<C, R, S, N>
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
        payload: PaymentChargeRequest,
    ) -> Result<PaymentAck, GatewayError> {
        let now_ms = self.clock.now_epoch_millis();
        gate_rate_limit(&self.rate_store, EndpointClass::Request, client_id, now_ms).await?;

        let token = session_token.ok_or(GatewayError::Unauthorized)?;
        let claims = self
            .signer
            .verify(token, now_ms)
            .map_err(|_| GatewayError::Unauthorized)?;

        let method = validate_payload(&payload)?;

        let charge = NewPaymentCharge {
            tenant_id: claims.tenant_id.clone(),
            session_id: claims.session_id.clone(),
            amount: payload.amount,
            method,
            reference_number: payload
                .reference
                .as_deref()
                .map(|r| sanitize_string(r.trim(), SHORT_FIELD_MAX_CHARS)),
            notes: payload
                .notes
                .as_deref()
                .map(|n| sanitize_string(n.trim(), SHORT_FIELD_MAX_CHARS)),
        };

        let ack = self.store.create_payment(charge).await.map_err(|err| {
            warn!(error = %err, "payment store call failed");
            GatewayError::Upstream
        })?;

        // Accounts is paged best-effort; the charge stands regardless.
        self.notifier.notify(StaffNotification {
            tenant_id: claims.tenant_id,
            title: "Guest payment submitted".to_string(),
            message: format!("Charge {} awaiting verification", ack.payment_id),
            priority: Priority::Normal,
            department: "accounts".to_string(),
            reference_id: ack.payment_id.clone(),
            metadata: json!({
                "sessionId": claims.session_id,
                "amount": payload.amount,
            }),
        });

        Ok(ack)
    }
}

fn validate_payload(payload: &PaymentChargeRequest) -> Result<PaymentMethod, GatewayError> {
    let mut details = Vec::new();

    if !payload.amount.is_finite() || payload.amount <= 0.0 {
        details.push("amount must be a positive number".to_string());
    } else if payload.amount > MAX_AMOUNT {
        details.push("amount exceeds the maximum accepted charge".to_string());
    }

    let method = match PaymentMethod::parse(&payload.payment_method) {
        Some(method) => method,
        None => {
            details.push(
                "paymentMethod must be one of cash, card, mobile_money, bank_transfer, room_charge"
                    .to_string(),
            );
            PaymentMethod::Cash
        }
    };

    if details.is_empty() {
        Ok(method)
    } else {
        Err(GatewayError::Validation(details))
    }
}

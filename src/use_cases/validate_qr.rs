use tracing::warn;

use crate::domain::entities::{EndpointClass, NewSessionClaims, SessionDescriptor};
use crate::domain::errors::GatewayError;
use crate::domain::ports::{Clock, GuestStore, RateLimitStore};
use crate::domain::token::TokenSigner;
use crate::interface_adapters::protocol::ValidateQrRequest;
use crate::use_cases::sanitize::sanitize_device_info;

const QR_TOKEN_MAX_CHARS: usize = 128;

// Response returned by the QR validation use case.
pub struct ValidateQrResponse {
    pub session: SessionDescriptor,
    pub token: String,
}

// Exchanges a scanned QR token for a session descriptor plus a signed session
// token. Pipeline: rate gate, shape check, sanitize, store call, sign.
pub struct ValidateQrUseCase<C, R, S> {
    pub clock: C,
    pub rate_store: R,
    pub store: S,
    pub signer: TokenSigner,
}

impl<C, R, S> ValidateQrUseCase<C, R, S>
where
    C: Clock,
    R: RateLimitStore,
    S: GuestStore,
{
    pub async fn execute(
        &self,
        client_id: &str,
        payload: ValidateQrRequest,
    ) -> Result<ValidateQrResponse, GatewayError> {
        let now_ms = self.clock.now_epoch_millis();
        gate_rate_limit(
            &self.rate_store,
            EndpointClass::Validate,
            client_id,
            now_ms,
        )
        .await?;

        validate_payload(&payload)?;

        let device_info = payload.device_info.map(sanitize_device_info);

        let lookup = self
            .store
            .validate_and_create_session(payload.qr_token.trim(), device_info)
            .await
            .map_err(|err| {
                warn!(error = %err, "session store call failed");
                GatewayError::Upstream
            })?;

        // An invalid QR carries no trustworthy session fields at all.
        if !lookup.is_valid {
            return Err(GatewayError::NotFound);
        }
        let session = lookup.into_descriptor().ok_or_else(|| {
            warn!("store reported a valid QR but omitted mandatory session fields");
            GatewayError::Upstream
        })?;

        let token = self
            .signer
            .sign(
                NewSessionClaims {
                    session_id: session.session_id.clone(),
                    tenant_id: session.tenant_id.clone(),
                    qr_code_id: session.qr_code_id.clone(),
                },
                now_ms,
            )
            .map_err(|_| GatewayError::Upstream)?;

        Ok(ValidateQrResponse { session, token })
    }
}

fn validate_payload(payload: &ValidateQrRequest) -> Result<(), GatewayError> {
    let mut details = Vec::new();

    if payload.qr_token.trim().is_empty() {
        details.push("qrToken is required".to_string());
    } else if payload.qr_token.chars().count() > QR_TOKEN_MAX_CHARS {
        details.push(format!("qrToken must be at most {QR_TOKEN_MAX_CHARS} characters"));
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(GatewayError::Validation(details))
    }
}

// Shared rate gate for all pipelines. A failing rate store admits the request
// rather than taking the gateway down with it.
pub(crate) async fn gate_rate_limit<R: RateLimitStore>(
    rate_store: &R,
    class: EndpointClass,
    client_id: &str,
    now_ms: u64,
) -> Result<(), GatewayError> {
    match rate_store.check(class, client_id, now_ms).await {
        Ok(decision) if decision.allowed => Ok(()),
        Ok(decision) => Err(GatewayError::RateLimited {
            reset_at_ms: decision.reset_at_ms,
        }),
        Err(err) => {
            warn!(error = %err, "rate limit check failed, allowing request");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        FixedClock, RecordingStore, ScriptedRateStore, StoreFailures, TEST_NOW_MS, TEST_TTL_MS,
        invalid_lookup, test_signer,
    };
    use serde_json::json;

    fn use_case(
        rate_store: ScriptedRateStore,
        store: RecordingStore,
    ) -> ValidateQrUseCase<FixedClock, ScriptedRateStore, RecordingStore> {
        ValidateQrUseCase {
            clock: FixedClock(TEST_NOW_MS),
            rate_store,
            store,
            signer: test_signer(),
        }
    }

    fn payload() -> ValidateQrRequest {
        ValidateQrRequest {
            qr_token: "abcdefghij0123456789".to_string(),
            device_info: None,
        }
    }

    #[tokio::test]
    async fn when_qr_is_valid_then_returns_session_and_signed_token() {
        let use_case = use_case(ScriptedRateStore::allowing(), RecordingStore::new());

        let result = use_case
            .execute("203.0.113.7", payload())
            .await
            .expect("expected validation to succeed");

        assert_eq!(result.session.session_id, "session-1");
        assert_eq!(result.session.hotel_name, "Harborview Hotel");
        assert_eq!(result.token.split('.').count(), 3);

        let claims = test_signer()
            .verify(&result.token, TEST_NOW_MS + 1)
            .expect("expected issued token to verify");
        assert_eq!(claims.session_id, "session-1");
        assert_eq!(claims.tenant_id, "tenant-1");
        assert_eq!(claims.expires_at, TEST_NOW_MS + TEST_TTL_MS);
    }

    #[tokio::test]
    async fn when_rate_limit_is_exceeded_then_returns_rate_limited_with_reset() {
        let use_case = use_case(
            ScriptedRateStore::rejecting(TEST_NOW_MS + 42_000),
            RecordingStore::new(),
        );

        let result = use_case.execute("203.0.113.7", payload()).await;

        assert!(matches!(
            result,
            Err(GatewayError::RateLimited { reset_at_ms }) if reset_at_ms == TEST_NOW_MS + 42_000
        ));
    }

    #[tokio::test]
    async fn when_rate_gate_rejects_then_store_is_never_called() {
        let store = RecordingStore::new();
        let use_case = use_case(ScriptedRateStore::rejecting(TEST_NOW_MS + 1), store.clone());

        let _ = use_case.execute("203.0.113.7", payload()).await;

        // A rejected call must short-circuit before any store traffic.
        assert_eq!(*store.validate_calls.lock().expect("call counter poisoned"), 0);
    }

    #[tokio::test]
    async fn when_qr_token_is_missing_then_returns_validation_error() {
        let use_case = use_case(ScriptedRateStore::allowing(), RecordingStore::new());

        let result = use_case
            .execute(
                "203.0.113.7",
                ValidateQrRequest {
                    qr_token: "   ".to_string(),
                    device_info: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(GatewayError::Validation(details)) if details == vec!["qrToken is required".to_string()]
        ));
    }

    #[tokio::test]
    async fn when_qr_token_is_too_long_then_returns_validation_error() {
        let use_case = use_case(ScriptedRateStore::allowing(), RecordingStore::new());

        let result = use_case
            .execute(
                "203.0.113.7",
                ValidateQrRequest {
                    qr_token: "q".repeat(129),
                    device_info: None,
                },
            )
            .await;

        assert!(matches!(result, Err(GatewayError::Validation(_))));
    }

    #[tokio::test]
    async fn when_store_reports_invalid_qr_then_returns_not_found() {
        let use_case = use_case(
            ScriptedRateStore::allowing(),
            RecordingStore::new().with_lookup(invalid_lookup()),
        );

        let result = use_case.execute("203.0.113.7", payload()).await;

        assert!(matches!(result, Err(GatewayError::NotFound)));
    }

    #[tokio::test]
    async fn when_store_call_fails_then_returns_upstream_error() {
        let use_case = use_case(
            ScriptedRateStore::allowing(),
            RecordingStore::new().with_failures(StoreFailures {
                validate: true,
                ..Default::default()
            }),
        );

        let result = use_case.execute("203.0.113.7", payload()).await;

        assert!(matches!(result, Err(GatewayError::Upstream)));
    }

    #[tokio::test]
    async fn when_rate_store_itself_fails_then_request_is_admitted() {
        let mut rate_store = ScriptedRateStore::allowing();
        rate_store.should_fail = true;
        let use_case = use_case(rate_store, RecordingStore::new());

        let result = use_case.execute("203.0.113.7", payload()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn when_device_info_is_supplied_then_it_is_checked_against_allow_list() {
        let use_case = use_case(ScriptedRateStore::allowing(), RecordingStore::new());

        let result = use_case
            .execute(
                "203.0.113.7",
                ValidateQrRequest {
                    qr_token: "abcdefghij0123456789".to_string(),
                    device_info: Some(json!({ "userAgent": "<x>", "evil": 1 })),
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn when_checked_then_rate_gate_uses_validate_class_and_client_id() {
        let rate_store = ScriptedRateStore::allowing();
        let use_case = use_case(rate_store.clone(), RecordingStore::new());

        let _ = use_case.execute("203.0.113.7", payload()).await;

        let seen = rate_store.seen.lock().expect("seen mutex poisoned");
        assert_eq!(
            seen.as_slice(),
            &[(EndpointClass::Validate, "203.0.113.7".to_string())]
        );
    }
}

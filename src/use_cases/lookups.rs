use serde_json::Value;
use tracing::warn;

use crate::domain::entities::EndpointClass;
use crate::domain::errors::GatewayError;
use crate::domain::ports::{Clock, GuestStore, RateLimitStore};
use crate::domain::token::TokenSigner;
use crate::use_cases::validate_qr::gate_rate_limit;

// Which store read a lookup targets.
#[derive(Clone, Copy, Debug)]
pub enum LookupKind {
    Request,
    SessionRequests,
    QrAnalytics,
}

// Read-only passthrough to the store. A supplied token must verify; a missing
// resource maps to NotFound.
pub struct LookupUseCase<C, R, S> {
    pub clock: C,
    pub rate_store: R,
    pub store: S,
    pub signer: TokenSigner,
}

impl<C, R, S> LookupUseCase<C, R, S>
where
    C: Clock,
    R: RateLimitStore,
    S: GuestStore,
{
    pub async fn execute(
        &self,
        client_id: &str,
        session_token: Option<&str>,
        kind: LookupKind,
        id: &str,
    ) -> Result<Value, GatewayError> {
        let now_ms = self.clock.now_epoch_millis();
        gate_rate_limit(&self.rate_store, EndpointClass::Request, client_id, now_ms).await?;

        if let Some(token) = session_token {
            self.signer
                .verify(token, now_ms)
                .map_err(|_| GatewayError::Unauthorized)?;
        }

        if id.trim().is_empty() {
            return Err(GatewayError::NotFound);
        }

        let result = match kind {
            LookupKind::Request => self.store.get_request(id).await,
            LookupKind::SessionRequests => self.store.session_requests(id).await,
            LookupKind::QrAnalytics => self.store.qr_analytics(id).await,
        };

        result
            .map_err(|err| {
                warn!(error = %err, "store read failed");
                GatewayError::Upstream
            })?
            .ok_or(GatewayError::NotFound)
    }
}

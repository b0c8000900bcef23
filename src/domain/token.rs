use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::entities::{NewSessionClaims, SessionClaims};

type HmacSha256 = Hmac<Sha256>;

// One opaque failure for malformed, forged and expired tokens alike, so the
// gateway never leaks which check rejected a token.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Invalid,
}

// Explicit signer configuration, passed in at construction time. The secret
// is never read from ambient environment state inside this module.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl_ms: u64,
}

#[derive(Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

// Issues and verifies compact signed session tokens:
// base64url(header) "." base64url(claims) "." base64url(hmac-sha256).
// Deterministic given the same secret and timestamp.
#[derive(Clone)]
pub struct TokenSigner {
    config: TokenConfig,
}

impl TokenSigner {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn ttl_ms(&self) -> u64 {
        self.config.ttl_ms
    }

    // Stamps issued_at/expires_at from now_ms and signs the full claim set.
    pub fn sign(&self, claims: NewSessionClaims, now_ms: u64) -> Result<String, TokenError> {
        let full = SessionClaims {
            session_id: claims.session_id,
            tenant_id: claims.tenant_id,
            qr_code_id: claims.qr_code_id,
            issued_at: now_ms,
            expires_at: now_ms + self.config.ttl_ms,
        };

        let header = TokenHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let header_json = serde_json::to_vec(&header).map_err(|_| TokenError::Invalid)?;
        let claims_json = serde_json::to_vec(&full).map_err(|_| TokenError::Invalid)?;

        let header_b64 = URL_SAFE_NO_PAD.encode(header_json);
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims_json);
        let signature = self.compute_signature(&header_b64, &claims_b64);

        Ok(format!("{header_b64}.{claims_b64}.{signature}"))
    }

    // Structural check, signature check, then expiry check, failing closed at
    // every step. The payload is decoded only after the signature matches.
    pub fn verify(&self, token: &str, now_ms: u64) -> Result<SessionClaims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Invalid);
        };
        if header_b64.is_empty() || claims_b64.is_empty() || signature_b64.is_empty() {
            return Err(TokenError::Invalid);
        }

        let expected = self.compute_signature(header_b64, claims_b64);
        // Constant-time comparison of the signature segments.
        if expected
            .as_bytes()
            .ct_eq(signature_b64.as_bytes())
            .unwrap_u8()
            != 1
        {
            return Err(TokenError::Invalid);
        }

        let claims_json = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|_| TokenError::Invalid)?;
        let claims: SessionClaims =
            serde_json::from_slice(&claims_json).map_err(|_| TokenError::Invalid)?;

        if claims.expires_at <= now_ms {
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    fn compute_signature(&self, header_b64: &str, claims_b64: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.config.secret.as_bytes())
            .expect("HMAC accepts keys of any size");
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::domain::errors::GatewayError;
use crate::interface_adapters::protocol::{
    ErrorBody, PaymentChargeRequest, PaymentChargeResponseBody, RateLimitErrorBody,
    SubmitRequestRequest, SubmitRequestResponseBody, ValidateQrRequest, ValidateQrResponseBody,
    ValidationErrorBody,
};
use crate::interface_adapters::security::SESSION_TOKEN_HEADER;
use crate::interface_adapters::state::AppState;
use crate::use_cases::lookups::{LookupKind, LookupUseCase};
use crate::use_cases::submit_payment::SubmitPaymentUseCase;
use crate::use_cases::submit_request::SubmitRequestUseCase;
use crate::use_cases::validate_qr::ValidateQrUseCase;

// Handler for exchanging a scanned QR token for a session and signed token.
pub async fn validate_qr(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ValidateQrRequest>,
) -> Result<Json<ValidateQrResponseBody>, Response> {
    let use_case = ValidateQrUseCase {
        clock: state.clock.clone(),
        rate_store: state.rate_store.clone(),
        store: state.store.clone(),
        signer: state.signer.clone(),
    };

    let result = use_case
        .execute(&client_identifier(&headers), payload)
        .await
        .map_err(|err| map_gateway_error(err, &state))?;

    Ok(Json(ValidateQrResponseBody {
        session: result.session,
        token: result.token,
    }))
}

// Handler for submitting a service request bound to a session.
pub async fn submit_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitRequestRequest>,
) -> Result<(StatusCode, Json<SubmitRequestResponseBody>), Response> {
    let use_case = SubmitRequestUseCase {
        clock: state.clock.clone(),
        rate_store: state.rate_store.clone(),
        store: state.store.clone(),
        notifier: state.notifier.clone(),
        signer: state.signer.clone(),
    };

    let ack = use_case
        .execute(
            &client_identifier(&headers),
            session_token(&headers).as_deref(),
            payload,
        )
        .await
        .map_err(|err| map_gateway_error(err, &state))?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitRequestResponseBody {
            request_id: ack.request_id,
            tracking_number: ack.tracking_number,
            created_at: ack.created_at,
        }),
    ))
}

// Handler for submitting a payment charge for later verification.
pub async fn payment_charge(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PaymentChargeRequest>,
) -> Result<(StatusCode, Json<PaymentChargeResponseBody>), Response> {
    let use_case = SubmitPaymentUseCase {
        clock: state.clock.clone(),
        rate_store: state.rate_store.clone(),
        store: state.store.clone(),
        notifier: state.notifier.clone(),
        signer: state.signer.clone(),
    };

    let ack = use_case
        .execute(
            &client_identifier(&headers),
            session_token(&headers).as_deref(),
            payload,
        )
        .await
        .map_err(|err| map_gateway_error(err, &state))?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentChargeResponseBody {
            payment_id: ack.payment_id,
            status: ack.status,
            is_verified: ack.is_verified,
            message: "payment submitted for verification".to_string(),
        }),
    ))
}

// Read-only passthrough handlers.

pub async fn get_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    lookup(state, headers, LookupKind::Request, id).await
}

pub async fn session_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    lookup(state, headers, LookupKind::SessionRequests, id).await
}

pub async fn qr_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    lookup(state, headers, LookupKind::QrAnalytics, id).await
}

async fn lookup(
    state: AppState,
    headers: HeaderMap,
    kind: LookupKind,
    id: String,
) -> Result<Json<serde_json::Value>, Response> {
    let use_case = LookupUseCase {
        clock: state.clock.clone(),
        rate_store: state.rate_store.clone(),
        store: state.store.clone(),
        signer: state.signer.clone(),
    };

    let value = use_case
        .execute(
            &client_identifier(&headers),
            session_token(&headers).as_deref(),
            kind,
            &id,
        )
        .await
        .map_err(|err| map_gateway_error(err, &state))?;

    Ok(Json(value))
}

// Fallback for unmatched method+path combinations.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not found".to_string(),
        }),
    )
        .into_response()
}

// Pulls the session token from the custom header, falling back to a bearer
// Authorization header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(SESSION_TOKEN_HEADER) {
        return value.to_str().ok().map(|v| v.trim().to_string());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
}

// Client identifier for rate limiting. Forwarded headers can be spoofed by
// direct clients; deployments front this service with a trusted proxy that
// overwrites them.
fn client_identifier(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|value| value.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    "unknown".to_string()
}

// Maps domain errors to the HTTP error contract.
fn map_gateway_error(err: GatewayError, state: &AppState) -> Response {
    match err {
        GatewayError::RateLimited { reset_at_ms } => {
            let now_ms = state.clock.now_epoch_millis();
            let retry_after_secs = reset_at_ms.saturating_sub(now_ms).div_ceil(1_000).max(1);
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(RateLimitErrorBody {
                    error: "rate limit exceeded".to_string(),
                    reset_at: reset_at_ms,
                }),
            )
                .into_response()
        }
        GatewayError::Validation(details) => (
            StatusCode::BAD_REQUEST,
            Json(ValidationErrorBody {
                error: "validation failed".to_string(),
                details,
            }),
        )
            .into_response(),
        GatewayError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "invalid or expired session token".to_string(),
            }),
        )
            .into_response(),
        GatewayError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "not found".to_string(),
            }),
        )
            .into_response(),
        GatewayError::Upstream => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "internal error".to_string(),
            }),
        )
            .into_response(),
    }
}

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::interface_adapters::handlers::{
    get_request, not_found, payment_charge, qr_analytics, session_requests, submit_request,
    validate_qr,
};
use crate::interface_adapters::security::{apply_security_headers, build_cors_layer};
use crate::interface_adapters::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/validate", post(validate_qr))
        .route("/request", post(submit_request))
        .route("/payment/charge", post(payment_charge))
        .route("/request/{id}", get(get_request))
        .route("/session/{id}/requests", get(session_requests))
        .route("/analytics/qr/{id}", get(qr_analytics))
        .fallback(not_found)
        .layer(build_cors_layer())
        // Outermost so preflight responses carry the hardening headers too.
        .layer(middleware::from_fn(apply_security_headers))
        .with_state(state)
}

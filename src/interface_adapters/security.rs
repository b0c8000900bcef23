use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{Any, CorsLayer};

// Header carrying the signed session token on non-validate routes.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

// Hardening headers attached to every response, preflight included.
pub async fn apply_security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // Prevent clickjacking by disabling iframe embedding.
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    // Prevent MIME type sniffing.
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    // The gateway serves JSON only; scripts and objects have no business here.
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'self'; script-src 'none'; object-src 'none';"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    response
}

// Permissive CORS for the guest-facing portal: any origin, fixed allow-list
// of headers including the custom session-token header. The CORS layer also
// answers OPTIONS preflight with no body.
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(SESSION_TOKEN_HEADER),
        ])
}

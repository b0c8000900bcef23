// Domain-level errors for the gateway pipelines. Mapping to HTTP status codes
// happens in the adapter layer.
#[derive(Debug)]
pub enum GatewayError {
    // Ceiling hit for the caller's endpoint class; recoverable after reset.
    RateLimited { reset_at_ms: u64 },
    // Shape violations; carries every field-level problem found, not just the
    // first one.
    Validation(Vec<String>),
    // Malformed, forged and expired tokens all collapse into this one signal
    // so callers cannot probe which check failed.
    Unauthorized,
    // Unknown QR token, request id or resource.
    NotFound,
    // Store call failed or timed out; detail is logged, never echoed.
    Upstream,
}

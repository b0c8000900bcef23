use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::SessionDescriptor;

// Request payload for QR validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateQrRequest {
    pub qr_token: String,
    #[serde(default)]
    pub device_info: Option<Value>,
}

// Response payload for QR validation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateQrResponseBody {
    pub session: SessionDescriptor,
    pub token: String,
}

// Request payload for a guest service request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestRequest {
    pub session_id: String,
    pub request_type: String,
    #[serde(default)]
    pub request_data: Option<Value>,
    #[serde(default)]
    pub priority: Option<String>,
}

// Response payload for an accepted service request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestResponseBody {
    pub request_id: String,
    pub tracking_number: String,
    pub created_at: String,
}

// Request payload for a payment charge.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChargeRequest {
    pub amount: f64,
    pub payment_method: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// Response payload for a submitted payment charge. Charges are never reported
// as paid here, only as submitted for verification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChargeResponseBody {
    pub payment_id: String,
    pub status: String,
    pub is_verified: bool,
    pub message: String,
}

// Error envelope for rate-limit rejections.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitErrorBody {
    pub error: String,
    pub reset_at: u64,
}

// Error envelope for validation rejections.
#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub error: String,
    pub details: Vec<String>,
}

// Generic error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

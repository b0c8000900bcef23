use serde::{Deserialize, Serialize};
use serde_json::Value;

// Session descriptor owned by the external store, mirrored into the signed
// token at issuance. Immutable after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub session_id: String,
    pub tenant_id: String,
    pub qr_code_id: String,
    pub hotel_name: String,
    pub room_number: Option<String>,
    pub services: Vec<String>,
    pub expires_at: String,
}

// Result of the store's validate-and-create-session procedure. When is_valid
// is false every other field is unreliable and must not be read, so all of
// them stay optional until the flag has been checked.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLookup {
    pub is_valid: bool,
    pub session_id: Option<String>,
    pub tenant_id: Option<String>,
    pub qr_code_id: Option<String>,
    pub hotel_name: Option<String>,
    pub room_number: Option<String>,
    pub services: Option<Vec<String>>,
    pub expires_at: Option<String>,
}

impl SessionLookup {
    // Collapses a valid lookup into a full descriptor. Returns None when the
    // store said the QR was valid but omitted mandatory fields.
    pub fn into_descriptor(self) -> Option<SessionDescriptor> {
        if !self.is_valid {
            return None;
        }
        Some(SessionDescriptor {
            session_id: self.session_id?,
            tenant_id: self.tenant_id?,
            qr_code_id: self.qr_code_id?,
            hotel_name: self.hotel_name?,
            room_number: self.room_number,
            services: self.services.unwrap_or_default(),
            expires_at: self.expires_at?,
        })
    }
}

// Claims carried inside the signed session token, epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub session_id: String,
    pub tenant_id: String,
    pub qr_code_id: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

// Claims as supplied to the signer, before timing fields are stamped.
#[derive(Clone, Debug, PartialEq)]
pub struct NewSessionClaims {
    pub session_id: String,
    pub tenant_id: String,
    pub qr_code_id: String,
}

// Service-request priority accepted from guests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

// Payment methods the gateway accepts before any store call is made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileMoney,
    BankTransfer,
    RoomCharge,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "mobile_money" => Some(Self::MobileMoney),
            "bank_transfer" => Some(Self::BankTransfer),
            "room_charge" => Some(Self::RoomCharge),
            _ => None,
        }
    }
}

// Acknowledgement returned by the store for a created service request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAck {
    pub request_id: String,
    pub tracking_number: String,
    pub created_at: String,
}

// Acknowledgement for a submitted payment charge. Charges are always created
// pending and unverified; verification happens in a back-office workflow.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAck {
    pub payment_id: String,
    pub status: String,
    pub is_verified: bool,
}

// Payment charge as handed to the store.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentCharge {
    pub tenant_id: String,
    pub session_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

// Best-effort staff notification payload.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffNotification {
    pub tenant_id: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub department: String,
    pub reference_id: String,
    pub metadata: Value,
}

// Named rate-limit bucket. Each class carries its own ceiling and window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    Validate,
    Request,
}

#[derive(Clone, Copy, Debug)]
pub struct RatePolicy {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl EndpointClass {
    // Validation endpoints are tighter than general request endpoints.
    pub fn policy(self) -> RatePolicy {
        match self {
            Self::Validate => RatePolicy {
                max_requests: 10,
                window_ms: 60_000,
            },
            Self::Request => RatePolicy {
                max_requests: 60,
                window_ms: 60_000,
            },
        }
    }
}

// Outcome of a rate-limit check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: u64,
}

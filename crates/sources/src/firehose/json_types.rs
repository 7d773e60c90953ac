//! JSON request and response types for Firehose delivery
//!
//! Wire shapes follow the Firehose HTTP delivery request/response format:
//! field names are camelCase and the timestamp is epoch milliseconds.

use serde::{Deserialize, Serialize};

/// One record inside a delivery envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct FirehoseRecord {
    /// Base64-encoded payload bytes.
    pub data: String,
}

/// A Firehose delivery envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct FirehoseEnvelope {
    #[serde(rename = "requestId")]
    pub request_id: String,

    /// Delivery time in epoch milliseconds.
    pub timestamp: i64,

    #[serde(default)]
    pub records: Vec<FirehoseRecord>,
}

/// Successful delivery acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct FirehoseAck {
    #[serde(rename = "requestId")]
    pub request_id: String,

    pub timestamp: i64,
}

/// Delivery error response.
#[derive(Debug, Clone, Serialize)]
pub struct FirehoseErrorBody {
    #[serde(rename = "errorMessage")]
    pub error_message: String,

    #[serde(rename = "requestId")]
    pub request_id: String,

    pub timestamp: i64,
}

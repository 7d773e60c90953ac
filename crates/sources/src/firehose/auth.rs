//! Firehose request authentication helpers
//!
//! Access-key extraction and source ARN parsing from delivery headers.

use axum::http::HeaderMap;

/// Header carrying the endpoint access key.
pub const ACCESS_KEY_HEADER: &str = "x-amz-firehose-access-key";

/// Header carrying the delivery stream's ARN.
pub const SOURCE_ARN_HEADER: &str = "x-amz-firehose-source-arn";

/// Extract the access key header, if present and well-formed.
pub fn extract_access_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACCESS_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|key| !key.is_empty())
}

/// Extract the raw source ARN header, or an empty string.
pub fn extract_source_arn(headers: &HeaderMap) -> &str {
    headers
        .get(SOURCE_ARN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

/// An Amazon Resource Name split into its individual fields.
///
/// Example for a delivery stream:
/// `arn:aws:firehose:us-east-1:123456789:deliverystream/vpc-flow-log-stream`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceArn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl SourceArn {
    /// Parse an ARN string. Anything without exactly six colon-separated
    /// sections (the resource part may itself contain colons) parses to all
    /// empty fields.
    pub fn parse(arn: &str) -> Self {
        let sections: Vec<&str> = arn.splitn(6, ':').collect();
        if sections.len() != 6 {
            return Self::default();
        }
        Self {
            partition: sections[1].to_string(),
            service: sections[2].to_string(),
            region: sections[3].to_string(),
            account_id: sections[4].to_string(),
            resource: sections[5].to_string(),
        }
    }
}

//! Data stream destination names
//!
//! Every event carries a fully populated destination triple. The rendered
//! name `type-dataset-namespace` is used verbatim as the bulk-item target,
//! so no part may be empty or contain the joining delimiter.

use serde::{Deserialize, Serialize};

/// Character joining the three parts of a data stream name.
pub const DELIMITER: char = '-';

/// Destination triple an event is routed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStream {
    /// Stream type, e.g. `logs`, `metrics` or `traces`.
    #[serde(rename = "type")]
    pub stream_type: String,

    /// Dataset within the stream type, e.g. `firehose`.
    pub dataset: String,

    /// Namespace separating tenants or environments, e.g. `default`.
    pub namespace: String,
}

impl DataStream {
    /// Stream type for log events.
    pub const TYPE_LOGS: &'static str = "logs";

    /// Stream type for metric events.
    pub const TYPE_METRICS: &'static str = "metrics";

    /// Stream type for trace events.
    pub const TYPE_TRACES: &'static str = "traces";

    /// Create a destination triple.
    pub fn new(
        stream_type: impl Into<String>,
        dataset: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            stream_type: stream_type.into(),
            dataset: dataset.into(),
            namespace: namespace.into(),
        }
    }

    /// Render the destination name `type-dataset-namespace`.
    pub fn name(&self) -> String {
        let mut out = String::with_capacity(
            self.stream_type.len() + self.dataset.len() + self.namespace.len() + 2,
        );
        self.write_name(&mut out);
        out
    }

    /// Render the destination name into a caller-provided builder.
    ///
    /// Used by the pooled encoder so the hot path reuses one allocation.
    pub fn write_name(&self, out: &mut String) {
        out.push_str(&self.stream_type);
        out.push(DELIMITER);
        out.push_str(&self.dataset);
        out.push(DELIMITER);
        out.push_str(&self.namespace);
    }

    /// Whether all three parts are populated and free of the delimiter.
    pub fn is_valid(&self) -> bool {
        [&self.stream_type, &self.dataset, &self.namespace]
            .iter()
            .all(|part| !part.is_empty() && !part.contains(DELIMITER))
    }
}

impl std::fmt::Display for DataStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.stream_type, DELIMITER, self.dataset, DELIMITER, self.namespace
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_joins_parts() {
        let ds = DataStream::new(DataStream::TYPE_LOGS, "firehose", "default");
        assert_eq!(ds.name(), "logs-firehose-default");
        assert_eq!(ds.to_string(), "logs-firehose-default");
    }

    #[test]
    fn test_write_name_appends() {
        let ds = DataStream::new("traces", "apm", "prod");
        let mut out = String::new();
        ds.write_name(&mut out);
        assert_eq!(out, "traces-apm-prod");
    }

    #[test]
    fn test_validity() {
        assert!(DataStream::new("logs", "apm.error", "default").is_valid());
        assert!(!DataStream::new("", "apm", "default").is_valid());
        assert!(!DataStream::new("logs", "", "default").is_valid());
        assert!(!DataStream::new("logs", "apm", "").is_valid());
        // A delimiter inside a part would make the rendered name ambiguous.
        assert!(!DataStream::new("logs", "apm-error", "default").is_valid());
    }

    #[test]
    fn test_serializes_with_type_key() {
        let ds = DataStream::new("logs", "firehose", "default");
        let json = serde_json::to_value(&ds).unwrap();
        assert_eq!(json["type"], "logs");
        assert_eq!(json["dataset"], "firehose");
        assert_eq!(json["namespace"], "default");
    }
}

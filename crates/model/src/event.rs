//! Normalized observability events
//!
//! `Event` is the record produced by agent-facing decoders and consumed by
//! the bulk indexer. Its `Serialize` impl is the document written to the
//! store, field for field.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::data_stream::DataStream;

/// A batch of events submitted to the indexer as one unit.
pub type Batch = Vec<Event>;

/// Kind of agent data an event was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processor {
    Transaction,
    Span,
    Error,
    Metricset,
    Log,
}

impl Processor {
    /// Processor name recorded in documents. Spans share the transaction
    /// processor name; metricsets are recorded under `metric`.
    pub fn name(&self) -> &'static str {
        match self {
            Processor::Transaction | Processor::Span => "transaction",
            Processor::Error => "error",
            Processor::Metricset => "metric",
            Processor::Log => "log",
        }
    }

    /// Processor event recorded in documents.
    pub fn event(&self) -> &'static str {
        match self {
            Processor::Transaction => "transaction",
            Processor::Span => "span",
            Processor::Error => "error",
            Processor::Metricset => "metric",
            Processor::Log => "log",
        }
    }
}

impl Serialize for Processor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Processor", 2)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("event", self.event())?;
        state.end()
    }
}

/// Cloud metadata attached to an event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cloud {
    /// Provenance of the data, as opposed to where it is being processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<CloudOrigin>,
}

/// Cloud provenance of the originating resource.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CloudOrigin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Cloud account identity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Account {
    pub id: String,
}

/// Service metadata attached to an event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<ServiceOrigin>,
}

/// Identity of the service the data originated from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceOrigin {
    /// Raw identifier of the originating resource, e.g. a full ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A normalized observability record.
///
/// The destination triple must be fully populated before the event reaches
/// the indexer; the indexer uses it verbatim as the bulk-item target.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Event {
    /// Event time in milliseconds since the Unix epoch.
    #[serde(rename = "@timestamp")]
    pub timestamp: i64,

    pub data_stream: DataStream,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<Processor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Cloud>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,

    /// Free-form key/value annotations.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub labels: serde_json::Map<String, serde_json::Value>,
}

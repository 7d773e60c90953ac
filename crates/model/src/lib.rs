//! Funnel - Event model
//!
//! Core types that flow through the ingestion pipeline:
//!
//! - `Event` - a normalized observability record (transaction, span, error,
//!   metricset or log) together with its destination
//! - `Batch` - the unit of submission from an ingestion handler to the indexer
//! - `DataStream` - the three-part destination name an event is routed to
//! - `Processor` - the kind of agent data the event was derived from
//!
//! An `Event` serializes directly into the self-describing JSON document that
//! is written to the downstream store; optional fields are omitted when unset
//! so documents stay sparse.

mod data_stream;
mod event;

pub use data_stream::DataStream;
pub use event::{Account, Batch, Cloud, CloudOrigin, Event, Processor, Service, ServiceOrigin};

//! Funnel - Authentication
//!
//! Access-key validation for ingestion endpoints. Keys are opaque strings
//! presented by delivery agents in a request header; the store validates
//! them in constant time so lookups do not leak key contents through timing.

mod store;

pub use store::AccessKeyStore;

//! Data Transfer Objects for the cluster-management API
//!
//! Request and response envelopes exchanged with the external service. The
//! wrapped payloads are domain types; these structs only add the envelope
//! keys the API uses.

pub mod cluster;
pub mod step;

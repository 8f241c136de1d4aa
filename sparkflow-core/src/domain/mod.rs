//! Core domain types
//!
//! This module contains the domain structures used across Sparkflow crates.
//! Clusters and steps live in the external cluster-management service; the
//! types here only describe what we read from it and what we ask it to create.

pub mod cluster;
pub mod definition;
pub mod handle;
pub mod step;

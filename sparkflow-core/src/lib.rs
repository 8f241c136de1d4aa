//! Sparkflow Core
//!
//! Core types shared by every Sparkflow component.
//!
//! This crate contains:
//! - Domain types: clusters, steps, their states and the definitions used to create them
//! - DTOs: request/response bodies exchanged with the cluster-management API

pub mod domain;
pub mod dto;

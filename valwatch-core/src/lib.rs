//! Valwatch Core
//!
//! Core types for watching runs of the remote validation service.
//!
//! This crate contains:
//! - Domain types: run identifiers, run states, status snapshots and the
//!   fixed validation phases
//! - DTOs: the JSON envelopes returned by the workflow API
//! - Metrics: pure derivations (remaining-time estimate, formatting) shared by
//!   the monitor and the CLI

pub mod domain;
pub mod dto;
pub mod metrics;

//! Core domain types
//!
//! These types describe a validation run as the remote service reports it.
//! The service owns the run lifecycle; everything here is read-only data
//! plus pure derivations over it.

pub mod run;
pub mod step;

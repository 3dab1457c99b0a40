//! wakametrics gateway library entry.
//!
//! This crate wires the collaborator contracts, the metrics collector and its
//! per-user aggregator, authentication, and the HTTP endpoint into one
//! service. It is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod auth;
pub mod backend;
pub mod collect;
pub mod config;
pub mod ops;
pub mod router;

//! wxpanel — weather station display core.
//!
//! Exposes the pure-logic modules (health supervision, telemetry store,
//! adaptive scales, screen navigation, message ingestion) together with
//! the drivers and host adapters, for the binary and for integration
//! testing.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod ingest;
pub mod nav;
pub mod scale;
pub mod scheduler;
pub mod telemetry;

pub mod adapters;
pub mod drivers;

//! Application core — pure domain logic, zero I/O.
//!
//! This module wires the weather panel together: service health
//! supervision, telemetry ingestion, screen navigation and the alert
//! indicator. All interaction with radios, sensors, brokers and the
//! display happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;

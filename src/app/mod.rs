//! Application core: pure domain orchestration, zero direct I/O.
//!
//! This module wires the Pixelpal business rules together: inbound
//! messages, debounced inputs, mood and display mode. All interaction
//! with hardware and the network happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without peripherals.

pub mod events;
pub mod ports;
pub mod service;

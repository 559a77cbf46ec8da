//! Pixelpal firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod animation;
pub mod app;
pub mod codec;
pub mod config;
pub mod error;
pub mod interaction;
pub mod link;
pub mod mode;
pub mod mood;
pub mod render;
pub mod state;
pub mod store;

pub mod pins;

// Adapters and drivers carry both the ESP-IDF implementation and the host
// simulation; the cfg split lives inside each module.
pub mod adapters;
pub mod drivers;

//! # Connection Actors
//!
//! The serial monitor's streaming ingestion core.
//!
//! ## Components
//!
//! - **MonitorActor**: Connection state machine; owns settings, the display
//!   buffer and the notification sink, and publishes everything as
//!   `SystemEvent`s
//! - **Session**: Per-connection task that requests the device, opens it and
//!   runs the read/decode loop until cancelled, end-of-stream or error
//! - **DisplayBuffer**: Accumulated text, as one blob or as timestamped records
//! - **Demo**: Simulated readings on a randomized timer, fed through the same
//!   publish path as real data

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod config;
pub mod constants;
pub mod demo;
pub mod display_buffer;
pub mod monitor_actor;
mod session;

pub use config::{DemoInterval, MonitorConfig};
pub use demo::{DemoRng, DEMO_SAMPLES};
pub use display_buffer::{DisplayBuffer, DisplayMode, RecordOrder};
pub use monitor_actor::MonitorActor;

//! # Actor Protocol
//!
//! Type-safe message definitions for the serial monitor core.
//!
//! This crate has zero dependencies on UI frameworks or WASM-specific APIs,
//! making it fully testable in native Rust environments.
//!
//! ## Architecture
//!
//! - **UiCommand**: Messages from UI → monitor
//! - **SystemEvent**: Messages from monitor → UI
//! - **ConnectionState**: FSM state machine (pure logic, no side effects)
//! - **MonitorError**: user-facing error taxonomy
//! - **Settings**: live user settings read by the ingestion path
//!
//! ## Message Flow
//!
//! ```text
//! UI → UiCommand → MonitorActor → spawned session / demo tasks
//!                      ↓
//!                 SystemEvent → UI
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod errors;
pub mod messages;
pub mod settings;
pub mod state;

pub use errors::{MonitorError, ReadErrorKind};
pub use messages::{DisplayDelta, ReceivedRecord, SystemEvent, UiCommand};
pub use settings::{Settings, BAUD_RATE_PRESETS, DEFAULT_BAUD_RATE};
pub use state::ConnectionState;

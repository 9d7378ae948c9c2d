//! # Core Types
//!
//! Boundaries between the serial monitor core and the collaborators it
//! consumes: the byte source that produces raw chunks and the notification
//! sink that plays a cue when text arrives.
//!
//! Nothing here knows about the browser or about tokio; adapters live in
//! `transport-webserial` and `transport-native`.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod clock;
pub mod transport;

pub use transport::{
    ByteSource, FlowControl, ParityMode, ReadOutcome, SerialConfig, SerialHost, SourceError,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    /// Audio subsystem missing, blocked by autoplay policy, or closed
    #[error("Audio unavailable: {0}")]
    Unavailable(String),
}

/// Plays a short audible cue when a non-empty unit of text is received.
///
/// The monitor checks the sound-enabled setting before calling, and only
/// logs failures; a sink can never stop ingestion.
pub trait NotificationSink: 'static {
    fn play_cue(&self) -> Result<(), CueError>;
}

/// Sink that never makes a sound
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl NotificationSink for SilentSink {
    fn play_cue(&self) -> Result<(), CueError> {
        Ok(())
    }
}

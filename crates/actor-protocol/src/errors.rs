//! Error Handling Guidelines
//!
//! All user-facing messages should follow this format:
//!
//! 1. **What failed**: Describe the operation that failed
//! 2. **Why it failed**: Provide the root cause if known
//! 3. **What to do**: Suggest user action when possible
//!
//! Examples:
//! - ✅ "Could not open the serial port: device busy. Close other programs using it and retry."
//! - ❌ "Open failed" (lacks context and action)
//!
//! Every error that reaches the monitor leaves the connection in
//! `Disconnected` (or unchanged, for rejected commands). Malformed bytes in
//! lossy decoding are the only fault absorbed instead of reported.

use core_types::SourceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sub-classification of failures while the port is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadErrorKind {
    /// Device disappeared mid-stream
    DeviceLost,
    /// Handle was already closed or locked
    InvalidState,
    /// Strict decoding hit a malformed sequence
    Decode,
    Other,
}

/// Unified error type for the monitor core
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorError {
    /// Environment cannot reach serial devices (e.g. browser without Web Serial)
    #[error("Serial access unsupported: {0}")]
    Unsupported(String),

    /// User dismissed the device chooser
    #[error("No device selected")]
    NoDeviceSelected,

    /// Host environment refused access
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Baud rate missing, non-numeric or not positive
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Device present but failed to open
    #[error("Open failed: {0}")]
    OpenFailed(String),

    /// Read loop failed while the port was open
    #[error("Read error ({kind:?}): {detail}")]
    Read { kind: ReadErrorKind, detail: String },

    /// Command not valid in the current state
    #[error("Cannot {action} while {state}")]
    Rejected { state: String, action: String },

    #[error("Demo mode is already running")]
    DemoAlreadyRunning,

    #[error("Demo mode is not running")]
    DemoNotRunning,

    /// State transition was rejected
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Communication channel closed
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl MonitorError {
    /// Classify a failure from `SerialHost::request_access`
    pub fn from_access(err: SourceError) -> Self {
        match err {
            SourceError::NoDeviceSelected => Self::NoDeviceSelected,
            SourceError::PermissionDenied(detail) => Self::PermissionDenied(detail),
            SourceError::Unsupported(detail) => Self::Unsupported(detail),
            other => Self::OpenFailed(other.to_string()),
        }
    }

    /// Classify a failure from `ByteSource::open`
    pub fn from_open(err: SourceError) -> Self {
        match err {
            SourceError::PermissionDenied(detail) => Self::PermissionDenied(detail),
            SourceError::InvalidConfiguration(detail) => Self::InvalidConfiguration(detail),
            SourceError::NoDeviceSelected => Self::NoDeviceSelected,
            SourceError::Unsupported(detail) => Self::Unsupported(detail),
            SourceError::OpenFailed(detail)
            | SourceError::NetworkError(detail)
            | SourceError::InvalidState(detail)
            | SourceError::Other(detail) => Self::OpenFailed(detail),
        }
    }

    /// Classify a failure from `ByteSource::read`
    pub fn from_read(err: SourceError) -> Self {
        let (kind, detail) = match err {
            SourceError::NetworkError(detail) => (ReadErrorKind::DeviceLost, detail),
            SourceError::InvalidState(detail) => (ReadErrorKind::InvalidState, detail),
            other => (ReadErrorKind::Other, other.to_string()),
        };
        Self::Read { kind, detail }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self::Read {
            kind: ReadErrorKind::Decode,
            detail: detail.into(),
        }
    }

    /// Can the user simply try again?
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoDeviceSelected
                | Self::OpenFailed(_)
                | Self::Read { .. }
                | Self::InvalidConfiguration(_)
        )
    }

    /// Message for the error banner
    pub fn user_message(&self) -> String {
        match self {
            Self::Unsupported(_) => {
                "This browser does not support the Web Serial API. \
                 Use Chrome 89+, Edge 89+ or Opera 75+ over HTTPS or localhost."
                    .into()
            }
            Self::NoDeviceSelected => {
                "No serial port was selected. Choose a port in the dialog to connect.".into()
            }
            Self::PermissionDenied(detail) if detail.contains("permissions policy") => {
                "Serial access is blocked by this page's permissions policy. \
                 Run the monitor locally or from a deployment that allows Web Serial."
                    .into()
            }
            Self::PermissionDenied(_) => {
                "Access to the serial port was denied. Check the browser's site permissions and retry."
                    .into()
            }
            Self::InvalidConfiguration(detail) => {
                format!("Cannot connect: {}. Enter a positive whole-number baud rate.", detail)
            }
            Self::OpenFailed(detail) => format!(
                "Could not open the serial port: {}. Make sure no other program is using it and retry.",
                detail
            ),
            Self::Read { kind, detail } => {
                let cause = match kind {
                    ReadErrorKind::DeviceLost => "the device was disconnected",
                    ReadErrorKind::InvalidState => "the port is no longer usable",
                    ReadErrorKind::Decode => "received data is not valid UTF-8",
                    ReadErrorKind::Other => "an unexpected error occurred",
                };
                format!(
                    "Reading from the serial port stopped: {} ({}). Reconnect to continue.",
                    cause, detail
                )
            }
            Self::Rejected { state, action } => {
                format!("Cannot {} while {}.", action, state)
            }
            Self::DemoAlreadyRunning => "Demo mode is already running.".into(),
            Self::DemoNotRunning => "Demo mode is not running.".into(),
            Self::InvalidTransition(detail) => format!("Internal state error: {}.", detail),
            Self::ChannelClosed(detail) => {
                format!("Monitor stopped responding ({}). Reload the page.", detail)
            }
        }
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a byte source collaborator.
///
/// These describe what the host environment said, not what the user sees.
/// The monitor classifies them into its own taxonomy depending on whether
/// they happened while requesting access, opening, or reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The host environment has no serial support at all
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// The user dismissed the device chooser without picking a port
    #[error("No device selected")]
    NoDeviceSelected,
    /// Host environment or policy refused access
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// The serial parameters were rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Device present but could not be opened
    #[error("Open failed: {0}")]
    OpenFailed(String),
    /// Device disappeared (unplugged, driver reset)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Handle already closed, locked, or otherwise unusable
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Other: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParityMode {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Hardware,
}

/// Serial line parameters handed to [`ByteSource::open`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: ParityMode,
    pub flow_control: FlowControl,
}

impl SerialConfig {
    /// Create a standard 8N1 configuration at specified baud rate
    pub fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            parity: ParityMode::None,
            flow_control: FlowControl::None,
        }
    }

    /// Parse user-supplied baud input into an 8N1 configuration.
    ///
    /// Accepts any positive integer that fits in a `u32`, so custom rates
    /// outside the preset list are allowed. Surrounding whitespace is ignored.
    pub fn from_baud_input(input: &str) -> Result<Self, SourceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SourceError::InvalidConfiguration(
                "baud rate is missing".into(),
            ));
        }

        let value: i64 = trimmed.parse().map_err(|_| {
            SourceError::InvalidConfiguration(format!("baud rate '{}' is not a number", trimmed))
        })?;

        if value <= 0 {
            return Err(SourceError::InvalidConfiguration(format!(
                "baud rate must be positive, got {}",
                value
            )));
        }

        let baud = u32::try_from(value).map_err(|_| {
            SourceError::InvalidConfiguration(format!("baud rate {} is too large", value))
        })?;

        Ok(Self::new_8n1(baud))
    }
}

/// Result of a single successful read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One chunk of bytes, possibly empty, possibly splitting a code point
    Chunk(Vec<u8>),
    /// The source has no more data
    EndOfStream,
}

/// Grants access to a device, yielding an unopened [`ByteSource`].
///
/// In the browser this is the port chooser; natively it may simply hand over
/// an already-available stream.
#[allow(async_fn_in_trait)]
pub trait SerialHost: 'static {
    type Source: ByteSource;

    /// Ask the environment for a device handle
    async fn request_access(&self) -> Result<Self::Source, SourceError>;
}

/// A sequential byte stream with explicit open/close.
///
/// Implementations must make `cancel_read` and `close` idempotent: calling
/// them on an already-cancelled or already-closed source returns `Ok(())`.
///
/// The monitor runs on a single cooperative timeline, so no `Send` bound is
/// required; browser handles are `!Send`.
#[allow(async_fn_in_trait)]
pub trait ByteSource: 'static {
    /// Open the device with the given line parameters
    async fn open(&mut self, config: &SerialConfig) -> Result<(), SourceError>;

    /// Wait for the next chunk, end-of-stream, or error.
    ///
    /// Only one read is outstanding at a time.
    async fn read(&mut self) -> Result<ReadOutcome, SourceError>;

    /// Abort an in-flight read. The pending read, if any, resolves or is dropped.
    async fn cancel_read(&mut self) -> Result<(), SourceError>;

    /// Release the device
    async fn close(&mut self) -> Result<(), SourceError>;
}

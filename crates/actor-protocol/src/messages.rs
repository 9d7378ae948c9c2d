use crate::errors::MonitorError;
use crate::settings::Settings;
use crate::state::ConnectionState;
use serde::{Deserialize, Serialize};

/// One received unit in record mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedRecord {
    /// Unique within a monitor session, increasing with each append
    pub id: u64,
    /// Decoded text exactly as received, embedded newlines included
    pub text: String,
    /// Capture time in microseconds since the Unix epoch
    pub received_at_us: u64,
}

/// Change to the display buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayDelta {
    /// A new record was added (record mode)
    Appended(ReceivedRecord),
    /// Text was concatenated to the blob (stream mode)
    TextAppended { text: String },
    /// Buffer emptied by the user
    Cleared,
}

/// Commands from UI to the monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiCommand {
    /// Request a device and open it with the configured baud rate
    Connect,

    /// Stop the current connection or demo
    Disconnect,

    /// Begin feeding simulated readings
    StartDemo,

    StopDemo,

    /// Empty the display buffer; connection state is untouched
    ClearDisplay,

    /// Raw baud input; validated at the next connect
    SetBaudRate { baud: String },

    SetSoundEnabled { enabled: bool },

    SetAutoScroll { enabled: bool },

    /// Tear everything down and stop the monitor actor
    Shutdown,
}

/// Events from the monitor to UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemEvent {
    /// Connection state has changed
    StateChanged { state: ConnectionState },

    /// Display buffer changed; scroll to the newest entry if requested
    DisplayChanged {
        delta: DisplayDelta,
        scroll_to_latest: bool,
    },

    /// Status message for user display
    StatusUpdate { message: String },

    /// Error occurred
    Error { error: MonitorError },

    /// Any previously shown error banner should be dismissed
    ErrorCleared,

    SettingsChanged { settings: Settings },
}

impl SystemEvent {
    pub fn error(error: MonitorError) -> Self {
        Self::Error { error }
    }
}

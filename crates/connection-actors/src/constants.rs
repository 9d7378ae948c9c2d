//! Centralized configuration constants for the monitor core
//!
//! All timing and sizing values are defined here with their rationale.
//!
//! **Before changing any constant:**
//! 1. Read its full documentation comment
//! 2. Check every `MonitorConfig` default that reads it
//! 3. Update documentation with your findings

/// Demo mode timing
pub mod demo {
    /// Shortest pause between two simulated readings (milliseconds)
    ///
    /// **Value**: 2000ms
    ///
    /// **Rationale**: Slow enough that each reading is noticed (cue plus
    /// scroll) but fast enough that a demo shows activity within a couple of
    /// seconds of being started.
    pub const MIN_INTERVAL_MS: u64 = 2000;

    /// Longest pause between two simulated readings (milliseconds)
    ///
    /// **Value**: 5000ms
    ///
    /// **Rationale**: Irregular 2-5s gaps resemble a sensor that reports on
    /// change rather than on a fixed clock. The interval is drawn uniformly
    /// from `MIN_INTERVAL_MS..=MAX_INTERVAL_MS` before every reading.
    pub const MAX_INTERVAL_MS: u64 = 5000;
}

/// Session lifecycle supervision
pub mod session {
    /// How long `Closing` may last before the monitor gives up on the device
    /// (milliseconds)
    ///
    /// **Value**: 5000ms
    ///
    /// **Rationale**: Cancelling a pending read and closing a port normally
    /// takes well under a second. A USB bridge that was yanked mid-close can
    /// leave the close call unsettled forever; after 5s the monitor reports
    /// `Disconnected` so the user can reconnect. The abandoned session still
    /// finishes its own teardown in the background.
    ///
    /// **Used in**: monitor_actor.rs (OperationTimeout handling)
    pub const CLOSING_TIMEOUT_MS: u64 = 5000;
}

/// Status texts shown next to the connection badge
pub mod status {
    /// Reported when the source signals end-of-stream
    pub const PEER_CLOSED: &str = "Connection closed by peer";

    /// Reported when a device never acknowledged close
    pub const CLOSE_TIMED_OUT: &str = "Device did not close in time; marked as disconnected";

    pub const DEMO_STARTED: &str = "Demo mode started";

    pub const DEMO_STOPPED: &str = "Demo mode stopped";
}

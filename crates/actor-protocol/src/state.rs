/// # Connection State Machine
///
/// Single source of truth for whether the monitor is receiving data and
/// from where.
///
/// ## State Transition Diagram
///
/// ```text
///                 StopDemo
///        ┌───────────────────────┐
///        │                       │
///   ┌────┴───┐   StartDemo   ┌───┴──────────┐
///   │  Demo  │◄──────────────┤ Disconnected │◄─────────────────┐
///   └────────┘               └──┬───────────┘                  │
///                               │    ▲   ▲                     │
///                       Connect │    │   │ Open failed /       │ Close
///                               │    │   │ no device           │ complete
///                         ┌─────▼────┴┐  │                ┌────┴─────┐
///                         │ Connecting├──┼───Disconnect──►│ Closing  │
///                         └─────┬─────┘  │                └────▲─────┘
///                     Port open │        │ End of stream /     │
///                         ┌─────▼─────┐  │ read error          │
///                         │   Open    ├──┘                     │
///                         └─────┬─────┘                        │
///                               └────────────Disconnect────────┘
/// ```
///
/// ## State Invariants
///
/// - **Disconnected**: no device handle, no read in flight, no demo timer
/// - **Connecting**: waiting for device access and open; handle may not exist yet
/// - **Open**: device open, exactly one read loop running
/// - **Closing**: read cancelled, waiting for the session to release the device
/// - **Demo**: demo timer running, no device involved
///
/// Demo and a real connection are mutually exclusive: both may only be
/// entered from `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConnectionState {
    /// No active connection, ready to connect or start a demo
    Disconnected,

    /// Requesting device access and opening the port
    Connecting,

    /// Port open and read loop running
    Open,

    /// User asked to disconnect, tearing down the session
    Closing,

    /// Simulated source feeding sample readings
    Demo,
}

impl ConnectionState {
    /// Can the user trigger a disconnect action?
    pub fn can_disconnect(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open | Self::Demo)
    }

    /// Is text currently flowing into the display buffer?
    pub fn is_receiving(&self) -> bool {
        matches!(self, Self::Open | Self::Demo)
    }

    /// A real device session exists (possibly still opening or closing)
    pub fn has_session(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open | Self::Closing)
    }

    /// User-facing status text
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Disconnected => "Not connected",
            Self::Connecting => "Connecting...",
            Self::Open => "Connected",
            Self::Closing => "Disconnecting...",
            Self::Demo => "Demo running",
        }
    }

    /// Validate if transition to new_state is allowed from current state
    pub fn can_transition_to(&self, new_state: ConnectionState) -> bool {
        use ConnectionState::*;

        match (self, new_state) {
            // From Disconnected
            (Disconnected, Connecting) => true, // User connects
            (Disconnected, Demo) => true,       // User starts demo
            (Disconnected, Disconnected) => true, // Idempotent (no-op)

            // From Connecting
            (Connecting, Open) => true,         // Device granted and opened
            (Connecting, Closing) => true,      // User cancels connection
            (Connecting, Disconnected) => true, // Access or open failed

            // From Open
            (Open, Closing) => true,      // User disconnect
            (Open, Disconnected) => true, // End of stream or read error

            // From Closing
            (Closing, Disconnected) => true, // Teardown complete

            // From Demo
            (Demo, Disconnected) => true, // Demo stopped

            // All other transitions are invalid
            _ => false,
        }
    }
}

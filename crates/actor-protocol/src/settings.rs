use serde::{Deserialize, Serialize};

/// Baud rates offered by the selector; any positive integer is accepted
pub const BAUD_RATE_PRESETS: &[u32] = &[9600, 19200, 38400, 57600, 115200];

pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// User-adjustable settings.
///
/// Owned by the monitor actor and read at the moment each event fires:
/// sound and auto-scroll on every append, baud rate only when connecting.
/// Changing the baud rate while a port is open affects the next connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Raw baud input as typed or selected; validated at connect time
    pub baud_rate: String,
    pub sound_enabled: bool,
    pub auto_scroll: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE.to_string(),
            sound_enabled: true,
            auto_scroll: true,
        }
    }
}

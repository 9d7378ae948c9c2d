//! Per-monitor configuration
//!
//! `MonitorConfig` is fixed when the monitor is created. User-editable
//! values (baud rate, sound, auto-scroll) live in `actor_protocol::Settings`
//! and can change at any time.

use crate::constants;
use crate::display_buffer::DisplayMode;
use actor_runtime::SupervisionConfig;
use decoders::DecodeMode;
use std::time::Duration;

/// Bounds for the randomized pause between demo readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoInterval {
    pub min: Duration,
    pub max: Duration,
}

impl DemoInterval {
    pub fn new(min: Duration, max: Duration) -> Self {
        // Swapped bounds are a caller mistake; keep the range usable
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }
}

impl Default for DemoInterval {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(constants::demo::MIN_INTERVAL_MS),
            Duration::from_millis(constants::demo::MAX_INTERVAL_MS),
        )
    }
}

/// Immutable configuration of one monitor instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// How received text is kept (blob or records, and record order)
    pub display_mode: DisplayMode,

    /// Lossy (replacement characters) or strict (malformed input ends the session)
    pub decode_mode: DecodeMode,

    pub demo_interval: DemoInterval,

    /// Timeouts for transitional states
    pub supervision: SupervisionConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::default(),
            decode_mode: DecodeMode::default(),
            demo_interval: DemoInterval::default(),
            supervision: SupervisionConfig {
                closing_timeout: Duration::from_millis(constants::session::CLOSING_TIMEOUT_MS),
            },
        }
    }
}

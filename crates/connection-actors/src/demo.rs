//! Demo mode: simulated readings on a randomized timer
//!
//! The demo task stands in for a session's read loop. It sleeps a random
//! interval, picks a sample, and hands it to the monitor as
//! `StateMessage::DemoTick`; the monitor then runs the same append and
//! notify path it uses for real data.

use crate::config::DemoInterval;
use actor_runtime::{actor_debug, race_with_cancellation, sleep, CancelToken, StateMessage};
use futures::SinkExt;
use futures_channel::mpsc;
use std::time::Duration;

/// Readings a demo picks from, including multi-line blocks
pub const DEMO_SAMPLES: [&str; 12] = [
    "Temperature: 23.5°C",
    "Humidity: 65%",
    "Pressure: 1013.25 hPa",
    "Light: 450 lux",
    "Motion detected",
    "Battery: 85%",
    "Signal strength: -45 dBm",
    "GPS Data:\nLat: 35.6762\nLon: 139.6503\nAlt: 40m",
    "Sensor Status:\n- Temperature: OK\n- Humidity: OK\n- Pressure: FAIL",
    "Multi-line log:\nINFO: System started\nWARN: Low battery\nERROR: Sensor disconnected",
    "JSON Data:\n{\n  \"temp\": 25.3,\n  \"humidity\": 60,\n  \"status\": \"ok\"\n}",
    "Command Response:\n> status\nSystem: Running\nUptime: 1d 5h 23m\n> ",
];

/// Small xorshift64* generator
///
/// Picks samples and intervals only; not suitable for anything
/// security-related.
#[derive(Debug, Clone)]
pub struct DemoRng {
    state: u64,
}

impl DemoRng {
    /// Seed from the platform RNG, falling back to the clock
    pub fn from_entropy() -> Self {
        let mut seed = [0u8; 8];
        match getrandom::getrandom(&mut seed) {
            Ok(()) => Self::from_seed(u64::from_le_bytes(seed)),
            Err(_) => Self::from_seed(core_types::clock::now_us()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        // Zero is a fixed point of xorshift
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Value in `0..bound` (0 when `bound` is 0)
    pub fn below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }

    pub fn pick_sample(&mut self) -> &'static str {
        let index = self.below(DEMO_SAMPLES.len() as u64) as usize;
        DEMO_SAMPLES.get(index).copied().unwrap_or_default()
    }

    /// Uniform millisecond-granular pause within `interval`, bounds inclusive
    pub fn interval(&mut self, interval: &DemoInterval) -> Duration {
        let span_ms = interval.max.saturating_sub(interval.min).as_millis();
        let span_ms = u64::try_from(span_ms).unwrap_or(u64::MAX - 1);
        interval.min + Duration::from_millis(self.below(span_ms + 1))
    }
}

/// Demo loop; runs until `token` is cancelled or the monitor goes away
///
/// A fresh interval is drawn before every reading.
pub(crate) async fn run_demo(
    operation_id: u32,
    token: CancelToken,
    interval: DemoInterval,
    mut rng: DemoRng,
    mut state_tx: mpsc::Sender<StateMessage>,
) {
    actor_debug!("Demo {} started", operation_id);

    loop {
        let wait = rng.interval(&interval);
        if race_with_cancellation(sleep(wait), &token).await.is_none() {
            break;
        }

        let tick = StateMessage::DemoTick {
            operation_id,
            text: rng.pick_sample().to_string(),
        };
        if state_tx.send(tick).await.is_err() {
            break;
        }
    }

    actor_debug!("Demo {} stopped", operation_id);
}

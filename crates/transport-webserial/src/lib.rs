//! # Web Serial Transport
//!
//! Browser collaborators for the monitor core:
//! - [`WebSerialHost`] / [`WebSerialPort`]: byte source over the Web Serial API
//! - [`WebAudioCue`]: notification sink that plays a short tone via Web Audio
//!
//! Note: Usage requires RUSTFLAGS="--cfg=web_sys_unstable_apis"

#![cfg(target_arch = "wasm32")]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod audio;
pub mod serial;

pub use audio::WebAudioCue;
pub use serial::{classify_js_error, WebSerialHost, WebSerialPort};

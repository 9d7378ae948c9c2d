//! Byte-to-text decoders for the serial monitor read loop.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod utf8;

pub use utf8::{DecodeMode, MalformedSequence, Utf8StreamDecoder, MAX_CARRY_OVER};

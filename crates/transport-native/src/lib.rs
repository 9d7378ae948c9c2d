//! # Native Transport
//!
//! Native collaborators for the monitor core, used by the CLI and by tests:
//! - [`StreamHost`] / [`StreamSource`]: byte source over any
//!   `tokio::io::AsyncRead` (stdin, a file, a character device)
//! - [`TerminalBell`]: notification sink that rings the terminal bell
//!
//! Line parameters are recorded but not applied; configure a real tty with
//! `stty` before handing it over.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod bell;
pub mod stream;

pub use bell::TerminalBell;
pub use stream::{StreamHost, StreamSource, READ_BUFFER_SIZE};

//! # Actor Runtime
//!
//! Provides the runtime infrastructure for the serial monitor's actor system.
//!
//! This crate defines:
//! - **Actor trait**: Base trait for all actors with lifecycle methods
//! - **Channel management**: Bounded message routing between UI and monitor
//! - **Spawn utilities**: Task spawning and timers for one cooperative timeline
//! - **Cancellation**: Tokens that interrupt a task's pending read or timer
//! - **Supervision**: Timeouts that unstick transitional states
//!
//! ## Architecture
//!
//! The actor runtime follows these principles:
//! - **Zero shared state**: Each actor owns its data
//! - **Message passing**: Actors communicate via typed messages
//! - **Sequential processing**: Messages are handled one at a time
//! - **Failure isolation**: Actor errors become UI events, not crashes
//!
//! ## Example
//!
//! ```ignore
//! use actor_runtime::{spawn_actor, ChannelManager};
//!
//! let (manager, handles) = ChannelManager::new();
//!
//! let monitor = MonitorActor::new(host, sink, config, handles.event_tx.clone(), manager.state_sender());
//! spawn_actor(monitor, handles.state_rx, handles.event_tx);
//!
//! manager.send_command(UiCommand::Connect)?;
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod actor;
pub mod cancellation;
pub mod channels;
pub mod executor;
pub mod logging;
pub mod supervision;

pub use actor::{spawn_actor, Actor};
pub use cancellation::{race_with_cancellation, CancelToken};
pub use channels::{ActorHandles, ChannelManager, StateMessage};
pub use executor::{sleep, spawn_task};
pub use supervision::{spawn_timeout, SupervisionConfig, TimeoutHandle};

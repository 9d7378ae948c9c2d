use actor_protocol::{ConnectionState, MonitorError, SystemEvent, UiCommand};
use futures_channel::mpsc;

/// Messages delivered to the monitor actor.
///
/// Everything except `UiCommand` comes from tasks the actor spawned. Those
/// carry the `operation_id` of the session or demo that produced them so
/// the actor can drop messages from a task it already tore down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMessage {
    /// Commands from UI
    UiCommand(UiCommand),

    /// Device granted and opened; the read loop is starting
    ConnectionEstablished { operation_id: u32 },

    /// Access or open failed before the read loop started
    ConnectionFailed {
        operation_id: u32,
        error: MonitorError,
    },

    /// Decoded text from one chunk (never empty)
    TextReceived { operation_id: u32, text: String },

    /// Source signalled end-of-stream; `trailing` is the decoder flush
    StreamEnded { operation_id: u32, trailing: String },

    /// Read loop stopped on an error; the device is already released
    ReadFailed {
        operation_id: u32,
        error: MonitorError,
    },

    /// Session observed cancellation and released the device
    ConnectionClosed { operation_id: u32 },

    /// Simulated reading from the demo timer
    DemoTick { operation_id: u32, text: String },

    /// Operation timeout (supervision)
    /// Sent when a transitional state doesn't resolve within expected time
    OperationTimeout {
        operation_id: u32,
        state: ConnectionState,
    },
}

/// Handles for spawning the monitor actor
pub struct ActorHandles {
    pub state_rx: mpsc::Receiver<StateMessage>,
    pub event_tx: mpsc::Sender<SystemEvent>,
}

/// Channel manager for UI ↔ monitor communication
///
/// Owns the bounded channels and gives the UI a single place to send
/// commands and receive events.
pub struct ChannelManager {
    state_tx: mpsc::Sender<StateMessage>,

    // Event receiver (NOT cloned, replaced with dummy in Clone impl)
    // Note: Clone creates a disconnected receiver - use take_event_receiver() before cloning
    event_rx: mpsc::Receiver<SystemEvent>,
}

impl Clone for ChannelManager {
    fn clone(&self) -> Self {
        let (_dummy_tx, dummy_rx) = mpsc::channel(1);
        Self {
            state_tx: self.state_tx.clone(),
            event_rx: dummy_rx,
        }
    }
}

impl ChannelManager {
    /// State inbox: commands plus session traffic. Sessions wait for
    /// capacity instead of dropping text, so this bounds memory rather
    /// than losing data.
    pub const STATE_CAPACITY: usize = 256;

    /// Event outbox to the UI (high frequency during fast serial bursts)
    pub const EVENT_CAPACITY: usize = 8192;

    /// Create a new channel manager and actor handles
    ///
    /// Returns (ChannelManager for UI, ActorHandles for spawning the monitor)
    pub fn new() -> (Self, ActorHandles) {
        let (state_tx, state_rx) = mpsc::channel(Self::STATE_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(Self::EVENT_CAPACITY);

        let handles = ActorHandles { state_rx, event_tx };
        let manager = Self { state_tx, event_rx };

        (manager, handles)
    }

    /// Send a UI command to the monitor
    pub fn send_command(&self, cmd: UiCommand) -> Result<(), MonitorError> {
        self.state_tx
            .clone()
            .try_send(StateMessage::UiCommand(cmd))
            .map_err(|e| {
                if e.is_full() {
                    MonitorError::ChannelClosed(
                        "too many pending commands, slow down".to_string(),
                    )
                } else {
                    MonitorError::ChannelClosed("monitor has shut down".to_string())
                }
            })
    }

    /// Get mutable reference to event receiver
    pub fn event_receiver(&mut self) -> &mut mpsc::Receiver<SystemEvent> {
        &mut self.event_rx
    }

    /// Take ownership of event receiver
    ///
    /// This allows the UI to move the receiver into a spawned task
    pub fn take_event_receiver(&mut self) -> mpsc::Receiver<SystemEvent> {
        let (_new_tx, new_rx) = mpsc::channel(1);
        std::mem::replace(&mut self.event_rx, new_rx)
    }

    /// Sender for tasks that report back to the monitor
    pub fn state_sender(&self) -> mpsc::Sender<StateMessage> {
        self.state_tx.clone()
    }
}

impl Default for ChannelManager {
    fn default() -> Self {
        Self::new().0
    }
}

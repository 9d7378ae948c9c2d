//! One connection attempt, from device request to released handle
//!
//! A session task is spawned per `Connect`. It owns the byte source and the
//! decoder, and reports to the monitor through `StateMessage`s tagged with
//! its `operation_id`:
//!
//! ```text
//! request_access ──► open ──► ConnectionEstablished
//!                              │
//!                              ▼
//!                  ┌──► read ──► decode ──► TextReceived ─┐
//!                  └──────────────────────────────────────┘
//!                              │
//!          cancelled ──► cancel_read + close ──► ConnectionClosed
//!      end-of-stream ──► close + flush        ──► StreamEnded
//!         read error ──► close                 ──► ReadFailed
//! ```
//!
//! The only suspension points that wait on the device (access, open, read)
//! are raced against the session's [`CancelToken`]. The read loop never
//! issues a new read before the previous one resolved, and every exit path
//! releases the device before reporting back, ignoring teardown errors.

use actor_protocol::MonitorError;
use actor_runtime::{
    actor_debug, actor_info, actor_warn, race_with_cancellation, CancelToken, StateMessage,
};
use core_types::{ByteSource, ReadOutcome, SerialConfig, SerialHost};
use decoders::{DecodeMode, Utf8StreamDecoder};
use futures::SinkExt;
use futures_channel::mpsc;
use std::rc::Rc;

/// How the read loop ended
enum Exit {
    Cancelled,
    EndOfStream,
    Failed(MonitorError),
}

/// Everything a session task needs, moved into the task at spawn time
pub(crate) struct Session<H: SerialHost> {
    pub host: Rc<H>,
    pub config: SerialConfig,
    pub decode_mode: DecodeMode,
    pub operation_id: u32,
    pub token: CancelToken,
    pub state_tx: mpsc::Sender<StateMessage>,
}

impl<H: SerialHost> Session<H> {
    pub async fn run(mut self) {
        let operation_id = self.operation_id;

        let mut source = match race_with_cancellation(self.host.request_access(), &self.token).await
        {
            None => {
                // Disconnect during the chooser: no handle was ever assigned
                self.report(StateMessage::ConnectionClosed { operation_id })
                    .await;
                return;
            }
            Some(Err(e)) => {
                self.report(StateMessage::ConnectionFailed {
                    operation_id,
                    error: MonitorError::from_access(e),
                })
                .await;
                return;
            }
            Some(Ok(source)) => source,
        };

        match race_with_cancellation(source.open(&self.config), &self.token).await {
            None => {
                release(&mut source, false).await;
                self.report(StateMessage::ConnectionClosed { operation_id })
                    .await;
                return;
            }
            Some(Err(e)) => {
                release(&mut source, false).await;
                self.report(StateMessage::ConnectionFailed {
                    operation_id,
                    error: MonitorError::from_open(e),
                })
                .await;
                return;
            }
            Some(Ok(())) => {}
        }

        actor_info!(
            "Session {} open at {} baud",
            operation_id,
            self.config.baud_rate
        );
        if !self
            .report(StateMessage::ConnectionEstablished { operation_id })
            .await
        {
            release(&mut source, false).await;
            return;
        }

        let mut decoder = Utf8StreamDecoder::with_mode(self.decode_mode);
        let exit = self.read_loop(&mut source, &mut decoder).await;

        let message = match exit {
            Exit::Cancelled => {
                release(&mut source, true).await;
                StateMessage::ConnectionClosed { operation_id }
            }
            Exit::EndOfStream => {
                release(&mut source, false).await;
                match decoder.flush() {
                    Ok(trailing) => StateMessage::StreamEnded {
                        operation_id,
                        trailing,
                    },
                    Err(e) => StateMessage::ReadFailed {
                        operation_id,
                        error: MonitorError::decode(e.to_string()),
                    },
                }
            }
            Exit::Failed(error) => {
                release(&mut source, false).await;
                StateMessage::ReadFailed {
                    operation_id,
                    error,
                }
            }
        };

        self.report(message).await;
        actor_debug!("Session {} finished", operation_id);
    }

    /// Read, decode and forward until cancelled, end-of-stream or an error
    async fn read_loop(
        &mut self,
        source: &mut H::Source,
        decoder: &mut Utf8StreamDecoder,
    ) -> Exit {
        let operation_id = self.operation_id;

        loop {
            let outcome = match race_with_cancellation(source.read(), &self.token).await {
                None => return Exit::Cancelled,
                Some(outcome) => outcome,
            };

            let bytes = match outcome {
                Ok(ReadOutcome::Chunk(bytes)) => bytes,
                Ok(ReadOutcome::EndOfStream) => return Exit::EndOfStream,
                Err(e) => return Exit::Failed(MonitorError::from_read(e)),
            };

            let text = match decoder.decode(&bytes) {
                Ok(text) => text,
                Err(e) => return Exit::Failed(MonitorError::decode(e.to_string())),
            };

            // A chunk that only extended the carry-over produces nothing yet
            if text.is_empty() {
                continue;
            }

            // Waits for capacity rather than dropping text
            if !self
                .report(StateMessage::TextReceived { operation_id, text })
                .await
            {
                return Exit::Cancelled;
            }
        }
    }

    /// Deliver a message to the monitor; false if the monitor is gone
    async fn report(&mut self, message: StateMessage) -> bool {
        match self.state_tx.send(message).await {
            Ok(()) => true,
            Err(_) => {
                actor_warn!(
                    "Session {}: monitor is gone, stopping",
                    self.operation_id
                );
                false
            }
        }
    }
}

/// Release the device; failures are logged, never propagated
async fn release<S: ByteSource>(source: &mut S, cancel_pending_read: bool) {
    if cancel_pending_read {
        if let Err(e) = source.cancel_read().await {
            actor_warn!("cancel_read failed during teardown: {}", e);
        }
    }
    if let Err(e) = source.close().await {
        actor_warn!("close failed during teardown: {}", e);
    }
}

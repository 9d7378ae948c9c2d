use crate::config::MonitorConfig;
use crate::constants::status;
use crate::demo::{run_demo, DemoRng};
use crate::display_buffer::DisplayBuffer;
use crate::session::Session;
use actor_protocol::{ConnectionState, MonitorError, Settings, SystemEvent, UiCommand};
use actor_runtime::{
    actor_debug, actor_info, actor_warn, spawn_task, spawn_timeout, Actor, CancelToken,
    StateMessage, TimeoutHandle,
};
use core_types::{clock, NotificationSink, SerialConfig, SerialHost};
use futures::SinkExt;
use futures_channel::mpsc;
use std::rc::Rc;

/// A spawned task (session or demo) and the token that stops it
#[derive(Debug)]
struct ActiveTask {
    operation_id: u32,
    token: CancelToken,
}

/// MonitorActor owns the connection state machine and the display buffer
///
/// Responsibilities:
/// - Maintain single source of truth for connection state
/// - Validate and execute state transitions
/// - Spawn and cancel the session (real device) or demo task
/// - Publish received text: append, emit, then play the cue if enabled
/// - Keep live settings; every event reads them when it fires
///
/// ## State Machine
///
/// For a complete state transition diagram and invariants, see:
/// `actor-protocol/src/state.rs` - ConnectionState documentation
///
/// Key coordination patterns:
/// - **Event-driven disconnect**: Closing → ConnectionClosed → Disconnected
/// - **Supervised close**: Closing → OperationTimeout → Disconnected
/// - **Stale filtering**: messages from a torn-down session or demo carry an
///   old `operation_id` and are dropped
pub struct MonitorActor<H: SerialHost, N: NotificationSink> {
    state: ConnectionState,
    settings: Settings,
    config: MonitorConfig,
    display: DisplayBuffer,

    host: Rc<H>,
    sink: N,

    event_tx: mpsc::Sender<SystemEvent>,

    // Channel to send messages to self (spawned tasks and timeouts)
    state_tx: mpsc::Sender<StateMessage>,

    // At most one of these is Some at a time
    session: Option<ActiveTask>,
    demo: Option<ActiveTask>,

    // Operation sequence tracking for detecting stale messages
    // Incremented for every session or demo start
    operation_sequence: u32,

    // Active timeout handle - automatically cancelled on the next transition
    active_timeout: Option<TimeoutHandle>,

    finished: bool,
}

impl<H: SerialHost, N: NotificationSink> MonitorActor<H, N> {
    pub fn new(
        host: H,
        sink: N,
        config: MonitorConfig,
        event_tx: mpsc::Sender<SystemEvent>,
        state_tx: mpsc::Sender<StateMessage>,
    ) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            settings: Settings::default(),
            display: DisplayBuffer::new(config.display_mode),
            config,
            host: Rc::new(host),
            sink,
            event_tx,
            state_tx,
            session: None,
            demo: None,
            operation_sequence: 0,
            active_timeout: None,
            finished: false,
        }
    }

    /// Start from previously saved settings instead of the defaults
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get next operation ID for a session or demo
    fn next_operation_id(&mut self) -> u32 {
        self.operation_sequence = self.operation_sequence.wrapping_add(1);
        self.operation_sequence
    }

    fn is_current_session(&self, operation_id: u32) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.operation_id == operation_id)
    }

    fn is_current_demo(&self, operation_id: u32) -> bool {
        self.demo
            .as_ref()
            .is_some_and(|d| d.operation_id == operation_id)
    }

    /// Deliver an event to the UI
    ///
    /// Waits for capacity so received text is never dropped. A closed
    /// channel only means nobody is watching.
    async fn emit(&mut self, event: SystemEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            actor_warn!("UI event dropped: {:?}", e);
        }
    }

    async fn status(&mut self, message: &str) {
        self.emit(SystemEvent::StatusUpdate {
            message: message.to_string(),
        })
        .await;
    }

    /// Attempt to transition to a new state
    ///
    /// Returns Ok if transition is valid, Err otherwise
    async fn transition(&mut self, new_state: ConnectionState) -> Result<(), MonitorError> {
        if !self.state.can_transition_to(new_state) {
            return Err(MonitorError::InvalidTransition(format!(
                "{:?} → {:?}",
                self.state, new_state
            )));
        }

        #[cfg(debug_assertions)]
        let old_state = self.state;

        // Cancel any active timeout from previous state
        if let Some(handle) = self.active_timeout.take() {
            handle.cancel();
        }

        self.state = new_state;
        self.emit(SystemEvent::StateChanged { state: new_state })
            .await;

        actor_debug!("State: {:?} → {:?}", old_state, new_state);

        if new_state == ConnectionState::Closing {
            self.active_timeout = self.spawn_closing_timeout();
        }

        Ok(())
    }

    /// Bound how long the device may take to acknowledge close
    fn spawn_closing_timeout(&self) -> Option<TimeoutHandle> {
        let operation_id = self.session.as_ref()?.operation_id;
        let after = self.config.supervision.closing_timeout;

        actor_debug!("Spawning {:?} timeout for Closing", after);
        Some(spawn_timeout(
            self.state_tx.clone(),
            StateMessage::OperationTimeout {
                operation_id,
                state: ConnectionState::Closing,
            },
            after,
        ))
    }

    fn rejected(&self, action: &str) -> MonitorError {
        MonitorError::Rejected {
            state: format!("{:?}", self.state),
            action: action.to_string(),
        }
    }

    /// Append received text, notify the UI, then play the cue
    ///
    /// Real sessions and demo mode both come through here. Settings are
    /// read now, not when the session started.
    async fn publish(&mut self, text: String) {
        let delta = self.display.append(text, clock::now_us());
        let scroll_to_latest = self.settings.auto_scroll;
        self.emit(SystemEvent::DisplayChanged {
            delta,
            scroll_to_latest,
        })
        .await;

        if self.settings.sound_enabled {
            if let Err(e) = self.sink.play_cue() {
                actor_warn!("Notification cue failed: {}", e);
            }
        }
    }

    async fn handle_connect(&mut self) -> Result<(), MonitorError> {
        // Never a second concurrent open, and never alongside demo mode
        if self.state != ConnectionState::Disconnected {
            return Err(self.rejected("connect"));
        }

        // Dismiss the previous error before trying again
        self.emit(SystemEvent::ErrorCleared).await;

        // Validate before any device call
        let config =
            SerialConfig::from_baud_input(&self.settings.baud_rate).map_err(MonitorError::from_open)?;

        self.transition(ConnectionState::Connecting).await?;

        let operation_id = self.next_operation_id();
        let token = CancelToken::new();

        actor_info!(
            "Connecting (operation {}, {} baud)",
            operation_id,
            config.baud_rate
        );

        spawn_task(
            Session {
                host: self.host.clone(),
                config,
                decode_mode: self.config.decode_mode,
                operation_id,
                token: token.clone(),
                state_tx: self.state_tx.clone(),
            }
            .run(),
        );

        self.session = Some(ActiveTask {
            operation_id,
            token,
        });

        Ok(())
    }

    async fn handle_disconnect(&mut self) -> Result<(), MonitorError> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {
                // The session observes the token at its next suspension point
                // and reports ConnectionClosed once the device is released
                if let Some(session) = &self.session {
                    session.token.cancel();
                }
                self.transition(ConnectionState::Closing).await?;
                self.emit(SystemEvent::ErrorCleared).await;
                Ok(())
            }
            // Disconnect doubles as "stop demo"
            ConnectionState::Demo => self.stop_demo().await,
            ConnectionState::Closing | ConnectionState::Disconnected => {
                actor_debug!("Disconnect ignored in {:?}", self.state);
                Ok(())
            }
        }
    }

    async fn handle_connection_established(&mut self, operation_id: u32) -> Result<(), MonitorError> {
        if !self.is_current_session(operation_id) {
            actor_debug!(
                "Ignoring stale ConnectionEstablished (operation_id={}, expected={})",
                operation_id,
                self.operation_sequence
            );
            return Ok(());
        }

        match self.state {
            ConnectionState::Connecting => {
                self.transition(ConnectionState::Open).await?;
                self.status(ConnectionState::Open.status_text()).await;
                Ok(())
            }
            // Disconnect raced the open; the session is already tearing down
            ConnectionState::Closing => Ok(()),
            other => Err(MonitorError::InvalidTransition(format!(
                "ConnectionEstablished while {:?}",
                other
            ))),
        }
    }

    /// Session ended on its own: end-of-stream, failure, or acknowledged close
    async fn end_session(&mut self) -> Result<(), MonitorError> {
        self.session = None;
        if self.state != ConnectionState::Disconnected {
            self.transition(ConnectionState::Disconnected).await?;
        }
        Ok(())
    }

    async fn handle_session_failed(
        &mut self,
        operation_id: u32,
        error: MonitorError,
    ) -> Result<(), MonitorError> {
        if !self.is_current_session(operation_id) {
            actor_debug!("Ignoring failure of stale session {}: {}", operation_id, error);
            return Ok(());
        }

        let was_closing = self.state == ConnectionState::Closing;
        self.end_session().await?;

        if was_closing {
            // User already asked to disconnect; nothing to report
            actor_debug!("Session {} failed while closing: {}", operation_id, error);
            return Ok(());
        }

        actor_warn!("Session {} failed: {}", operation_id, error);
        Err(error)
    }

    async fn handle_stream_ended(
        &mut self,
        operation_id: u32,
        trailing: String,
    ) -> Result<(), MonitorError> {
        if !self.is_current_session(operation_id) {
            return Ok(());
        }

        if !trailing.is_empty() {
            self.publish(trailing).await;
        }

        // The read can resolve end-of-stream in the same turn as a user
        // disconnect; that is still the user's close, not the peer's
        let was_closing = self.state == ConnectionState::Closing;
        self.end_session().await?;
        if !was_closing {
            self.status(status::PEER_CLOSED).await;
        }
        Ok(())
    }

    async fn handle_operation_timeout(
        &mut self,
        operation_id: u32,
        state: ConnectionState,
    ) -> Result<(), MonitorError> {
        // Check if we're still in the same state and session that triggered the timeout
        if self.state != state || !self.is_current_session(operation_id) {
            actor_debug!(
                "Ignoring stale timeout for {:?} (now {:?})",
                state,
                self.state
            );
            return Ok(());
        }

        actor_warn!("{:?} timed out for session {}", state, operation_id);

        // Token is already cancelled; the session finishes teardown on its
        // own and its late ConnectionClosed will be stale
        self.end_session().await?;
        self.status(status::CLOSE_TIMED_OUT).await;
        Ok(())
    }

    async fn handle_start_demo(&mut self) -> Result<(), MonitorError> {
        match self.state {
            ConnectionState::Disconnected => {}
            ConnectionState::Demo => return Err(MonitorError::DemoAlreadyRunning),
            _ => return Err(self.rejected("start demo mode")),
        }

        let operation_id = self.next_operation_id();
        let token = CancelToken::new();

        spawn_task(run_demo(
            operation_id,
            token.clone(),
            self.config.demo_interval,
            DemoRng::from_entropy(),
            self.state_tx.clone(),
        ));

        self.demo = Some(ActiveTask {
            operation_id,
            token,
        });
        self.transition(ConnectionState::Demo).await?;
        self.status(status::DEMO_STARTED).await;
        Ok(())
    }

    async fn stop_demo(&mut self) -> Result<(), MonitorError> {
        if self.state != ConnectionState::Demo {
            return Err(MonitorError::DemoNotRunning);
        }

        if let Some(demo) = self.demo.take() {
            demo.token.cancel();
        }
        self.transition(ConnectionState::Disconnected).await?;
        self.status(status::DEMO_STOPPED).await;
        Ok(())
    }

    async fn handle_demo_tick(&mut self, operation_id: u32, text: String) {
        if self.state != ConnectionState::Demo || !self.is_current_demo(operation_id) {
            actor_debug!("Ignoring stale DemoTick (operation_id={})", operation_id);
            return;
        }
        self.publish(text).await;
    }

    async fn handle_clear(&mut self) {
        let delta = self.display.clear();
        self.emit(SystemEvent::DisplayChanged {
            delta,
            scroll_to_latest: false,
        })
        .await;
    }

    async fn update_settings(&mut self, update: impl FnOnce(&mut Settings)) {
        update(&mut self.settings);
        let settings = self.settings.clone();
        self.emit(SystemEvent::SettingsChanged { settings }).await;
    }

    /// Cancel every task and stop the actor loop
    async fn handle_shutdown(&mut self) -> Result<(), MonitorError> {
        self.cancel_tasks();
        if self.state != ConnectionState::Disconnected {
            self.transition(ConnectionState::Disconnected).await?;
        }
        self.finished = true;
        Ok(())
    }

    fn cancel_tasks(&mut self) {
        if let Some(session) = self.session.take() {
            session.token.cancel();
        }
        if let Some(demo) = self.demo.take() {
            demo.token.cancel();
        }
        if let Some(handle) = self.active_timeout.take() {
            handle.cancel();
        }
    }
}

impl<H: SerialHost, N: NotificationSink> Actor for MonitorActor<H, N> {
    type Message = StateMessage;

    fn name(&self) -> &'static str {
        "MonitorActor"
    }

    async fn handle(&mut self, msg: StateMessage) -> Result<(), MonitorError> {
        match msg {
            StateMessage::UiCommand(cmd) => match cmd {
                UiCommand::Connect => self.handle_connect().await?,
                UiCommand::Disconnect => self.handle_disconnect().await?,
                UiCommand::StartDemo => self.handle_start_demo().await?,
                UiCommand::StopDemo => self.stop_demo().await?,
                UiCommand::ClearDisplay => self.handle_clear().await,
                UiCommand::SetBaudRate { baud } => {
                    // Takes effect at the next connect; an open session keeps its rate
                    self.update_settings(|s| s.baud_rate = baud).await
                }
                UiCommand::SetSoundEnabled { enabled } => {
                    self.update_settings(|s| s.sound_enabled = enabled).await
                }
                UiCommand::SetAutoScroll { enabled } => {
                    self.update_settings(|s| s.auto_scroll = enabled).await
                }
                UiCommand::Shutdown => self.handle_shutdown().await?,
            },

            StateMessage::ConnectionEstablished { operation_id } => {
                self.handle_connection_established(operation_id).await?
            }

            StateMessage::ConnectionFailed {
                operation_id,
                error,
            }
            | StateMessage::ReadFailed {
                operation_id,
                error,
            } => self.handle_session_failed(operation_id, error).await?,

            StateMessage::TextReceived { operation_id, text } => {
                // Text that raced a disconnect still arrived; keep it
                if self.is_current_session(operation_id) {
                    self.publish(text).await;
                } else {
                    actor_debug!("Dropping text from stale session {}", operation_id);
                }
            }

            StateMessage::StreamEnded {
                operation_id,
                trailing,
            } => self.handle_stream_ended(operation_id, trailing).await?,

            StateMessage::ConnectionClosed { operation_id } => {
                if self.is_current_session(operation_id) {
                    actor_info!("Session {} closed", operation_id);
                    self.end_session().await?;
                } else {
                    actor_debug!("Ignoring stale ConnectionClosed ({})", operation_id);
                }
            }

            StateMessage::DemoTick { operation_id, text } => {
                self.handle_demo_tick(operation_id, text).await
            }

            StateMessage::OperationTimeout {
                operation_id,
                state,
            } => self.handle_operation_timeout(operation_id, state).await?,
        }

        Ok(())
    }

    async fn shutdown(&mut self) {
        self.cancel_tasks();
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use actor_protocol::DisplayDelta;
    use core_types::{ByteSource, CueError, ReadOutcome, SourceError};
    use std::cell::Cell;

    /// Host whose chooser never answers
    struct PendingHost {
        requests: Rc<Cell<u32>>,
    }

    struct NeverSource;

    impl ByteSource for NeverSource {
        async fn open(&mut self, _config: &SerialConfig) -> Result<(), SourceError> {
            Ok(())
        }
        async fn read(&mut self) -> Result<ReadOutcome, SourceError> {
            futures::future::pending().await
        }
        async fn cancel_read(&mut self) -> Result<(), SourceError> {
            Ok(())
        }
        async fn close(&mut self) -> Result<(), SourceError> {
            Ok(())
        }
    }

    impl SerialHost for PendingHost {
        type Source = NeverSource;

        async fn request_access(&self) -> Result<NeverSource, SourceError> {
            self.requests.set(self.requests.get() + 1);
            futures::future::pending().await
        }
    }

    #[derive(Clone, Default)]
    struct CountingSink {
        plays: Rc<Cell<u32>>,
        broken: bool,
    }

    impl NotificationSink for CountingSink {
        fn play_cue(&self) -> Result<(), CueError> {
            self.plays.set(self.plays.get() + 1);
            if self.broken {
                Err(CueError::Unavailable("no audio device".into()))
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        actor: MonitorActor<PendingHost, CountingSink>,
        event_rx: mpsc::Receiver<SystemEvent>,
        requests: Rc<Cell<u32>>,
        plays: Rc<Cell<u32>>,
        _state_rx: mpsc::Receiver<StateMessage>,
    }

    fn create_test_actor() -> Fixture {
        create_test_actor_with_sink(CountingSink::default())
    }

    fn create_test_actor_with_sink(sink: CountingSink) -> Fixture {
        let (event_tx, event_rx) = mpsc::channel(100);
        let (state_tx, state_rx) = mpsc::channel(100);
        let requests = Rc::new(Cell::new(0));
        let plays = sink.plays.clone();
        let host = PendingHost {
            requests: requests.clone(),
        };
        let actor = MonitorActor::new(host, sink, MonitorConfig::default(), event_tx, state_tx);
        Fixture {
            actor,
            event_rx,
            requests,
            plays,
            _state_rx: state_rx,
        }
    }

    fn drain(rx: &mut mpsc::Receiver<SystemEvent>) -> Vec<SystemEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Pretend a session with `operation_id` reached Open
    fn force_open(actor: &mut MonitorActor<PendingHost, CountingSink>, operation_id: u32) {
        actor.state = ConnectionState::Open;
        actor.operation_sequence = operation_id;
        actor.session = Some(ActiveTask {
            operation_id,
            token: CancelToken::new(),
        });
    }

    #[tokio::test]
    async fn test_initial_state() {
        let fx = create_test_actor();
        assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
        assert_eq!(fx.actor.settings(), &Settings::default());
        assert!(fx.actor.display().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_baud_never_requests_device() {
        for bad in ["0", "-9600", "fast", ""] {
            let mut fx = create_test_actor();
            fx.actor
                .handle(StateMessage::UiCommand(UiCommand::SetBaudRate {
                    baud: bad.into(),
                }))
                .await
                .unwrap();

            let result = fx
                .actor
                .handle(StateMessage::UiCommand(UiCommand::Connect))
                .await;

            assert!(
                matches!(result, Err(MonitorError::InvalidConfiguration(_))),
                "{:?} gave {:?}",
                bad,
                result
            );
            assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
            assert_eq!(fx.requests.get(), 0);
            assert!(fx.actor.session.is_none());
        }
    }

    #[tokio::test]
    async fn test_connect_then_disconnect_while_connecting() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut fx = create_test_actor();

                fx.actor
                    .handle(StateMessage::UiCommand(UiCommand::Connect))
                    .await
                    .unwrap();
                assert_eq!(fx.actor.state(), ConnectionState::Connecting);

                // Second connect is rejected, not a second open
                let again = fx
                    .actor
                    .handle(StateMessage::UiCommand(UiCommand::Connect))
                    .await;
                assert!(matches!(again, Err(MonitorError::Rejected { .. })));

                let token = fx.actor.session.as_ref().unwrap().token.clone();
                fx.actor
                    .handle(StateMessage::UiCommand(UiCommand::Disconnect))
                    .await
                    .unwrap();
                assert_eq!(fx.actor.state(), ConnectionState::Closing);
                assert!(token.is_cancelled());

                // Session acknowledges; no device handle was ever assigned
                fx.actor
                    .handle(StateMessage::ConnectionClosed { operation_id: 1 })
                    .await
                    .unwrap();
                assert_eq!(fx.actor.state(), ConnectionState::Disconnected);

                let states: Vec<_> = drain(&mut fx.event_rx)
                    .into_iter()
                    .filter_map(|e| match e {
                        SystemEvent::StateChanged { state } => Some(state),
                        _ => None,
                    })
                    .collect();
                assert_eq!(
                    states,
                    vec![
                        ConnectionState::Connecting,
                        ConnectionState::Closing,
                        ConnectionState::Disconnected
                    ]
                );
            })
            .await;
    }

    #[tokio::test]
    async fn test_connection_established_rejects_stale_operation() {
        let mut fx = create_test_actor();
        fx.actor.state = ConnectionState::Connecting;
        fx.actor.operation_sequence = 5;
        fx.actor.session = Some(ActiveTask {
            operation_id: 5,
            token: CancelToken::new(),
        });

        fx.actor
            .handle(StateMessage::ConnectionEstablished { operation_id: 4 })
            .await
            .unwrap();
        assert_eq!(fx.actor.state(), ConnectionState::Connecting);

        fx.actor
            .handle(StateMessage::ConnectionEstablished { operation_id: 5 })
            .await
            .unwrap();
        assert_eq!(fx.actor.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_text_publishes_and_plays_cue() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 3);

        fx.actor
            .handle(StateMessage::TextReceived {
                operation_id: 3,
                text: "Light: 450 lux".into(),
            })
            .await
            .unwrap();

        assert_eq!(fx.plays.get(), 1);
        assert_eq!(fx.actor.display().size(), 1);
        match drain(&mut fx.event_rx).as_slice() {
            [SystemEvent::DisplayChanged {
                delta: DisplayDelta::Appended(record),
                scroll_to_latest: true,
            }] => assert_eq!(record.text, "Light: 450 lux"),
            other => panic!("Unexpected events: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_text_is_dropped() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 3);

        fx.actor
            .handle(StateMessage::TextReceived {
                operation_id: 2,
                text: "late".into(),
            })
            .await
            .unwrap();

        assert!(fx.actor.display().is_empty());
        assert_eq!(fx.plays.get(), 0);
        assert!(drain(&mut fx.event_rx).is_empty());
    }

    #[tokio::test]
    async fn test_settings_are_read_live() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);

        fx.actor
            .handle(StateMessage::UiCommand(UiCommand::SetSoundEnabled {
                enabled: false,
            }))
            .await
            .unwrap();
        fx.actor
            .handle(StateMessage::UiCommand(UiCommand::SetAutoScroll {
                enabled: false,
            }))
            .await
            .unwrap();
        drain(&mut fx.event_rx);

        fx.actor
            .handle(StateMessage::TextReceived {
                operation_id: 1,
                text: "quiet".into(),
            })
            .await
            .unwrap();
        assert_eq!(fx.plays.get(), 0);
        assert!(matches!(
            drain(&mut fx.event_rx).as_slice(),
            [SystemEvent::DisplayChanged {
                scroll_to_latest: false,
                ..
            }]
        ));

        fx.actor
            .handle(StateMessage::UiCommand(UiCommand::SetSoundEnabled {
                enabled: true,
            }))
            .await
            .unwrap();
        fx.actor
            .handle(StateMessage::TextReceived {
                operation_id: 1,
                text: "loud".into(),
            })
            .await
            .unwrap();
        assert_eq!(fx.plays.get(), 1);
    }

    #[tokio::test]
    async fn test_cue_failure_does_not_stop_ingestion() {
        let mut fx = create_test_actor_with_sink(CountingSink {
            plays: Rc::new(Cell::new(0)),
            broken: true,
        });
        force_open(&mut fx.actor, 1);

        for text in ["a", "b"] {
            fx.actor
                .handle(StateMessage::TextReceived {
                    operation_id: 1,
                    text: text.into(),
                })
                .await
                .unwrap();
        }

        assert_eq!(fx.plays.get(), 2);
        assert_eq!(fx.actor.display().size(), 2);
        assert_eq!(fx.actor.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_stream_end_publishes_trailing_then_disconnects() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);

        fx.actor
            .handle(StateMessage::StreamEnded {
                operation_id: 1,
                trailing: "\u{FFFD}".into(),
            })
            .await
            .unwrap();

        assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
        assert!(fx.actor.session.is_none());
        let records: Vec<_> = fx.actor.display().records().map(|r| r.text.clone()).collect();
        assert_eq!(records, vec!["\u{FFFD}"]);

        let events = drain(&mut fx.event_rx);
        assert!(events.contains(&SystemEvent::StatusUpdate {
            message: status::PEER_CLOSED.into()
        }));
    }

    #[tokio::test]
    async fn test_stream_end_while_closing_is_not_a_peer_close() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);
        fx.actor.state = ConnectionState::Closing;

        fx.actor
            .handle(StateMessage::StreamEnded {
                operation_id: 1,
                trailing: "tail".into(),
            })
            .await
            .unwrap();

        assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
        assert_eq!(fx.actor.display().size(), 1);
        assert!(!drain(&mut fx.event_rx)
            .iter()
            .any(|e| matches!(e, SystemEvent::StatusUpdate { .. })));
    }

    #[tokio::test]
    async fn test_read_error_forces_disconnected() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);

        let error = MonitorError::from_read(SourceError::NetworkError("gone".into()));
        let result = fx
            .actor
            .handle(StateMessage::ReadFailed {
                operation_id: 1,
                error: error.clone(),
            })
            .await;

        assert_eq!(result, Err(error));
        assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_failure_while_closing_is_not_reported() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);
        fx.actor.state = ConnectionState::Closing;

        let result = fx
            .actor
            .handle(StateMessage::ReadFailed {
                operation_id: 1,
                error: MonitorError::from_read(SourceError::InvalidState("closed".into())),
            })
            .await;

        assert_eq!(result, Ok(()));
        assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_operation_timeout_forces_disconnected() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);
        fx.actor.state = ConnectionState::Closing;

        fx.actor
            .handle(StateMessage::OperationTimeout {
                operation_id: 1,
                state: ConnectionState::Closing,
            })
            .await
            .unwrap();
        assert_eq!(fx.actor.state(), ConnectionState::Disconnected);

        // Late acknowledgement from the abandoned session is stale
        fx.actor
            .handle(StateMessage::ConnectionClosed { operation_id: 1 })
            .await
            .unwrap();
        assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_operation_timeout_ignored_after_state_change() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);

        fx.actor
            .handle(StateMessage::OperationTimeout {
                operation_id: 1,
                state: ConnectionState::Closing,
            })
            .await
            .unwrap();
        assert_eq!(fx.actor.state(), ConnectionState::Open);
        assert!(drain(&mut fx.event_rx).is_empty());
    }

    #[tokio::test]
    async fn test_demo_lifecycle_and_exclusivity() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut fx = create_test_actor();

                assert_eq!(
                    fx.actor
                        .handle(StateMessage::UiCommand(UiCommand::StopDemo))
                        .await,
                    Err(MonitorError::DemoNotRunning)
                );

                fx.actor
                    .handle(StateMessage::UiCommand(UiCommand::StartDemo))
                    .await
                    .unwrap();
                assert_eq!(fx.actor.state(), ConnectionState::Demo);

                assert_eq!(
                    fx.actor
                        .handle(StateMessage::UiCommand(UiCommand::StartDemo))
                        .await,
                    Err(MonitorError::DemoAlreadyRunning)
                );
                assert!(matches!(
                    fx.actor
                        .handle(StateMessage::UiCommand(UiCommand::Connect))
                        .await,
                    Err(MonitorError::Rejected { .. })
                ));
                assert_eq!(fx.requests.get(), 0);

                let demo_id = fx.actor.demo.as_ref().unwrap().operation_id;
                fx.actor
                    .handle(StateMessage::DemoTick {
                        operation_id: demo_id,
                        text: "Battery: 85%".into(),
                    })
                    .await
                    .unwrap();
                assert_eq!(fx.plays.get(), 1);

                // Disconnect stops the demo
                fx.actor
                    .handle(StateMessage::UiCommand(UiCommand::Disconnect))
                    .await
                    .unwrap();
                assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
                assert!(fx.actor.demo.is_none());

                // Ticks from the stopped demo are ignored
                fx.actor
                    .handle(StateMessage::DemoTick {
                        operation_id: demo_id,
                        text: "late".into(),
                    })
                    .await
                    .unwrap();
                assert_eq!(fx.actor.display().size(), 1);

                // Clean state allows a new demo
                fx.actor
                    .handle(StateMessage::UiCommand(UiCommand::StartDemo))
                    .await
                    .unwrap();
                assert_eq!(fx.actor.state(), ConnectionState::Demo);
            })
            .await;
    }

    #[tokio::test]
    async fn test_demo_rejected_while_open() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);

        assert!(matches!(
            fx.actor
                .handle(StateMessage::UiCommand(UiCommand::StartDemo))
                .await,
            Err(MonitorError::Rejected { .. })
        ));
        assert_eq!(fx.actor.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_clear_keeps_connection_state() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);
        fx.actor
            .handle(StateMessage::TextReceived {
                operation_id: 1,
                text: "old".into(),
            })
            .await
            .unwrap();

        fx.actor
            .handle(StateMessage::UiCommand(UiCommand::ClearDisplay))
            .await
            .unwrap();

        assert!(fx.actor.display().is_empty());
        assert_eq!(fx.actor.state(), ConnectionState::Open);
        assert_eq!(
            drain(&mut fx.event_rx).last(),
            Some(&SystemEvent::DisplayChanged {
                delta: DisplayDelta::Cleared,
                scroll_to_latest: false
            })
        );
    }

    #[tokio::test]
    async fn test_shutdown_cancels_session() {
        let mut fx = create_test_actor();
        force_open(&mut fx.actor, 1);
        let token = fx.actor.session.as_ref().unwrap().token.clone();

        fx.actor
            .handle(StateMessage::UiCommand(UiCommand::Shutdown))
            .await
            .unwrap();

        assert!(token.is_cancelled());
        assert!(fx.actor.is_finished());
        assert_eq!(fx.actor.state(), ConnectionState::Disconnected);
    }
}

use crate::executor::spawn_task;
use crate::{actor_debug, actor_warn};
use actor_protocol::{MonitorError, SystemEvent};
use futures::stream::StreamExt;
use futures_channel::mpsc;

/// A stateful component driven by its inbox
///
/// The actor owns its state outright; the outside world only reaches it by
/// sending messages, which are handled strictly one after another.
///
/// # Lifecycle
///
/// `init()` once, then `handle()` per message, then `shutdown()`.
///
/// The loop ends when every sender is dropped or when `is_finished()`
/// reports true after a message.
///
/// # Send Bounds
///
/// The monitor runs on one cooperative timeline (browser main thread, or a
/// tokio `LocalSet` natively), so actors and messages need not be `Send`.
/// This lets actors hold `Rc` handles to browser objects.
///
/// # Example
///
/// ```ignore
/// struct EchoActor {
///     event_tx: mpsc::Sender<SystemEvent>,
/// }
///
/// impl Actor for EchoActor {
///     type Message = String;
///
///     fn name(&self) -> &'static str {
///         "EchoActor"
///     }
///
///     async fn handle(&mut self, msg: Self::Message) -> Result<(), MonitorError> {
///         Ok(())
///     }
/// }
/// ```
#[allow(async_fn_in_trait)]
pub trait Actor: 'static {
    /// Message type this actor processes
    type Message: 'static;

    /// Actor name (used for logging and debugging)
    fn name(&self) -> &'static str;

    /// Initialize the actor before processing messages
    async fn init(&mut self) -> Result<(), MonitorError> {
        Ok(())
    }

    /// Handle a single message
    ///
    /// An `Err` is reported to the UI as `SystemEvent::Error` and the loop
    /// continues with the next message.
    async fn handle(&mut self, msg: Self::Message) -> Result<(), MonitorError>;

    /// Clean up before shutdown
    async fn shutdown(&mut self) {}

    /// Stop the loop after the current message
    fn is_finished(&self) -> bool {
        false
    }

    /// Consume the actor and process `rx` until it closes or the actor finishes
    ///
    /// Errors from `init` and `handle` go to `event_tx`.
    async fn run(mut self, mut rx: mpsc::Receiver<Self::Message>, event_tx: mpsc::Sender<SystemEvent>)
    where
        Self: Sized,
    {
        if let Err(e) = self.init().await {
            report(&event_tx, self.name(), e);
            return;
        }

        actor_debug!("{} started", self.name());

        while let Some(msg) = rx.next().await {
            if let Err(e) = self.handle(msg).await {
                report(&event_tx, self.name(), e);
            }
            if self.is_finished() {
                break;
            }
        }

        self.shutdown().await;

        actor_debug!("{} stopped", self.name());
    }
}

fn report(event_tx: &mpsc::Sender<SystemEvent>, name: &str, error: MonitorError) {
    actor_warn!("{} error: {}", name, error);
    if let Err(e) = event_tx.clone().try_send(SystemEvent::error(error)) {
        actor_warn!("{}: error event dropped: {:?}", name, e);
    }
}

/// Helper to spawn an actor on the current thread's executor
pub fn spawn_actor<A>(actor: A, rx: mpsc::Receiver<A::Message>, event_tx: mpsc::Sender<SystemEvent>)
where
    A: Actor,
{
    spawn_task(actor.run(rx, event_tx));
}

//! The asynchronous console driver.
//!
//! Architecture: reactor pattern. The transport and the session core are
//! owned by one background task; user commands flow in through an mpsc
//! channel, one-shot query replies flow back through oneshot channels, and
//! the two heartbeat timers are plain sleeps multiplexed into the same
//! `select!` loop. Everything the session does therefore happens strictly in
//! arrival order on one task - no locks anywhere near the reassembly state.
//!
//! ```ignore
//! let (transport, harness) = memory_pair();
//! let (console, mut events) = Console::connect(transport, ConsoleConfig::new("ion")).await?;
//! console.set_targets([RecordTarget::CueList, RecordTarget::Patch].into_iter().collect())?;
//! while let Some(event) = events.recv().await { /* ... */ }
//! ```

use std::collections::BTreeSet;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Sleep;
use tracing::{debug, info, warn};

use crate::message::{Argument, Message};
use crate::session::{
    ConsoleEvent, ConsoleSession, ConsoleState, Effect, SessionEvent, Snapshots,
    HEARTBEAT_FAILURE_INTERVAL, HEARTBEAT_INTERVAL,
};
use crate::target::RecordTarget;
use crate::transport::{Transport, TransportEvent};

/// Configuration for a [`Console`].
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Console name, for logging.
    pub name: String,
    /// Interval between heartbeats while the console is answering.
    pub heartbeat_interval: Duration,
    /// How long to wait for any reply before declaring unresponsiveness.
    pub failure_interval: Duration,
}

impl ConsoleConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            heartbeat_interval: HEARTBEAT_INTERVAL,
            failure_interval: HEARTBEAT_FAILURE_INTERVAL,
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_failure_interval(mut self, interval: Duration) -> Self {
        self.failure_interval = interval;
        self
    }
}

enum Command {
    SetTargets(BTreeSet<RecordTarget>),
    Synchronize,
    Request {
        address: String,
        arguments: Vec<Argument>,
        reply: oneshot::Sender<Message>,
    },
    Shutdown,
}

/// Handle to a running console session.
///
/// Cheap to clone-ish (share it behind an `Arc` if needed); dropping the
/// handle does not stop the reactor - call [`Console::disconnect`].
pub struct Console {
    name: String,
    cmd_tx: mpsc::UnboundedSender<Command>,
    state: Arc<AtomicU8>,
    snapshots: Snapshots,
}

impl Console {
    /// Connect the transport and spawn the reactor task. Returns the handle
    /// plus the stream of session events.
    pub async fn connect<T: Transport>(
        mut transport: T,
        config: ConsoleConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ConsoleEvent>)> {
        let (session, snapshots) = ConsoleSession::new(&config.name);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = Arc::new(AtomicU8::new(ConsoleState::Unknown as u8));

        transport
            .connect()
            .await
            .with_context(|| format!("{}: transport connect failed", config.name))?;
        info!("{}: transport connecting", config.name);

        let name = config.name.clone();
        let reactor_state = state.clone();
        tokio::spawn(async move {
            reactor_task(transport, session, cmd_rx, event_tx, reactor_state, config).await;
        });

        Ok((
            Self {
                name,
                cmd_tx,
                state,
                snapshots,
            },
            event_rx,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current session state, readable from any task.
    pub fn state(&self) -> ConsoleState {
        ConsoleState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Read-only live views of every synchronized collection.
    pub fn snapshots(&self) -> Snapshots {
        self.snapshots.clone()
    }

    /// Replace the enabled target set. Filter negotiation and
    /// synchronization happen once the console is responsive.
    pub fn set_targets(&self, targets: BTreeSet<RecordTarget>) -> Result<()> {
        self.cmd_tx
            .send(Command::SetTargets(targets))
            .map_err(|_| anyhow::anyhow!("{}: reactor gone", self.name))
    }

    /// Restart a full resynchronization of the enabled targets.
    pub fn synchronize(&self) -> Result<()> {
        self.cmd_tx
            .send(Command::Synchronize)
            .map_err(|_| anyhow::anyhow!("{}: reactor gone", self.name))
    }

    /// One-off query correlated by its relative reply address. Fails if the
    /// session disconnects before the reply arrives.
    pub async fn request(
        &self,
        relative_address: &str,
        arguments: Vec<Argument>,
    ) -> Result<Message> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Request {
                address: relative_address.to_string(),
                arguments,
                reply: reply_tx,
            })
            .map_err(|_| anyhow::anyhow!("{}: reactor gone", self.name))?;
        reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("{}: request dropped before a reply arrived", self.name))
    }

    /// Read the console's software version.
    pub async fn read_version(&self) -> Result<String> {
        let reply = self.request("/get/version", vec![]).await?;
        let version = reply
            .args()
            .str(0)
            .context("version reply carried no version string")?;
        Ok(version.to_string())
    }

    /// Disconnect and stop the reactor.
    pub fn disconnect(&self) -> Result<()> {
        self.cmd_tx
            .send(Command::Shutdown)
            .map_err(|_| anyhow::anyhow!("{}: reactor gone", self.name))
    }
}

/// A timer slot: armed or quiet. Completes only while armed, then disarms
/// itself so the reactor does not spin on an elapsed sleep.
async fn timer_slot(slot: &mut Option<Pin<Box<Sleep>>>) {
    match slot.as_mut() {
        Some(sleep) => {
            sleep.as_mut().await;
            *slot = None;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn reactor_task<T: Transport>(
    mut transport: T,
    mut session: ConsoleSession,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<ConsoleEvent>,
    state: Arc<AtomicU8>,
    config: ConsoleConfig,
) {
    let mut heartbeat_timer: Option<Pin<Box<Sleep>>> = None;
    let mut failure_timer: Option<Pin<Box<Sleep>>> = None;
    let mut shutting_down = false;

    debug!("{}: reactor task started", config.name);

    loop {
        let effects = tokio::select! {
            // Bias towards commands so a shutdown never loses to a busy
            // inbound stream.
            biased;

            command = cmd_rx.recv() => match command {
                Some(Command::SetTargets(targets)) => session.set_targets(targets),
                Some(Command::Synchronize) => session.synchronize(),
                Some(Command::Request { address, arguments, reply }) => {
                    session.request(&address, arguments, Box::new(move |message| {
                        let _ = reply.send(message.clone());
                    }))
                }
                Some(Command::Shutdown) | None => {
                    info!("{}: reactor shutting down", config.name);
                    transport.disconnect().await;
                    shutting_down = true;
                    session.handle(SessionEvent::Disconnected)
                }
            },

            event = transport.recv() => match event {
                Some(TransportEvent::Connected) => session.handle(SessionEvent::Connected),
                Some(TransportEvent::Disconnected) => session.handle(SessionEvent::Disconnected),
                Some(TransportEvent::Packet(message)) => session.handle(SessionEvent::Packet(message)),
                None => {
                    warn!("{}: transport stream ended", config.name);
                    shutting_down = true;
                    session.handle(SessionEvent::Disconnected)
                }
            },

            _ = timer_slot(&mut heartbeat_timer) => session.handle(SessionEvent::HeartbeatDue),

            _ = timer_slot(&mut failure_timer) => session.handle(SessionEvent::FailureTimeout),
        };

        for effect in effects {
            match effect {
                Effect::Send(packet) => {
                    if let Err(error) = transport.send(packet).await {
                        warn!("{}: send failed: {error}", config.name);
                    }
                }
                Effect::ArmFailureTimer => {
                    failure_timer = Some(Box::pin(tokio::time::sleep(config.failure_interval)));
                }
                Effect::DisarmFailureTimer => failure_timer = None,
                Effect::ScheduleHeartbeat => {
                    heartbeat_timer = Some(Box::pin(tokio::time::sleep(config.heartbeat_interval)));
                }
                Effect::CancelHeartbeat => heartbeat_timer = None,
                Effect::Emit(event) => {
                    if let ConsoleEvent::StateChanged(new_state) = &event {
                        state.store(*new_state as u8, Ordering::Relaxed);
                    }
                    let _ = event_tx.send(event);
                }
            }
        }

        if shutting_down {
            break;
        }
    }

    debug!("{}: reactor task exiting", config.name);
}

//! PlannerManager - actor that owns the Planner
//!
//! One task owns the state machine. User commands, host messages and timer
//! firings are all serialized through it, and each resulting snapshot is
//! published on a watch channel for the view.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::host::{HostConnection, HostPort, Subscription};

use super::machine::{Effect, Planner, PlannerSettings, Timer};
use super::messages::{PlannerCommand, PlannerError, PlannerResponse};
use super::state::PlannerState;

/// Handle to send commands to the planner actor
#[derive(Clone)]
pub struct PlannerManager {
    tx: mpsc::Sender<PlannerCommand>,
    snapshot_rx: watch::Receiver<PlannerState>,
}

impl PlannerManager {
    /// Mount a planner on `connection` and spawn its actor
    pub fn spawn(settings: PlannerSettings, connection: HostConnection) -> Self {
        debug!(mode = %connection.mode(), "PlannerManager::spawn: called");
        let (mode, port, subscription) = connection.into_parts();

        let mut planner = Planner::new(settings);
        planner.mount(mode);

        let (tx, rx) = mpsc::channel(64);
        let (snapshot_tx, snapshot_rx) = watch::channel(planner.state().clone());

        let actor = Actor {
            planner,
            port,
            snapshot_tx,
            timers: JoinSet::new(),
            timer_tx: None,
        };
        tokio::spawn(actor.run(rx, subscription));

        info!(%mode, "PlannerManager spawned");
        Self { tx, snapshot_rx }
    }

    /// Subscribe to state snapshots
    pub fn subscribe(&self) -> watch::Receiver<PlannerState> {
        self.snapshot_rx.clone()
    }

    /// Latest published state
    pub fn snapshot(&self) -> PlannerState {
        self.snapshot_rx.borrow().clone()
    }

    /// Add an item; the new item's ID on success
    pub async fn add_item(&self, label: impl Into<String>, hours: Option<f64>) -> PlannerResponse<String> {
        let label = label.into();
        debug!(%label, ?hours, "add_item: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PlannerCommand::AddItem {
                label,
                hours,
                reply: reply_tx,
            })
            .await
            .map_err(|_| PlannerError::ChannelError)?;
        reply_rx.await.map_err(|_| PlannerError::ChannelError)?
    }

    /// Toggle an item; false if no such item
    pub async fn toggle_item(&self, id: &str) -> PlannerResponse<bool> {
        debug!(%id, "toggle_item: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PlannerCommand::ToggleItem {
                id: id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| PlannerError::ChannelError)?;
        reply_rx.await.map_err(|_| PlannerError::ChannelError)?
    }

    /// Remove an item; false if no such item
    pub async fn remove_item(&self, id: &str) -> PlannerResponse<bool> {
        debug!(%id, "remove_item: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PlannerCommand::RemoveItem {
                id: id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| PlannerError::ChannelError)?;
        reply_rx.await.map_err(|_| PlannerError::ChannelError)?
    }

    /// Start a save of the current list
    pub async fn save(&self) -> PlannerResponse<()> {
        debug!("save: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PlannerCommand::Save { reply: reply_tx })
            .await
            .map_err(|_| PlannerError::ChannelError)?;
        reply_rx.await.map_err(|_| PlannerError::ChannelError)?
    }

    /// Tear the planner down and wait until it has let go of its resources
    pub async fn shutdown(&self) -> PlannerResponse<()> {
        debug!("shutdown: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PlannerCommand::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| PlannerError::ChannelError)?;
        reply_rx.await.map_err(|_| PlannerError::ChannelError)
    }
}

/// State owned by the actor task
struct Actor {
    planner: Planner,
    port: Option<Arc<dyn HostPort>>,
    snapshot_tx: watch::Sender<PlannerState>,
    timers: JoinSet<()>,
    timer_tx: Option<mpsc::UnboundedSender<Timer>>,
}

/// Reply to send once the command's effects have been applied
type DeferredReply = Box<dyn FnOnce() + Send>;

/// What the actor loop does after a command
enum Step {
    Continue(DeferredReply),
    /// Tear down, then acknowledge on this sender
    Stop(oneshot::Sender<()>),
}

impl Actor {
    async fn run(mut self, mut rx: mpsc::Receiver<PlannerCommand>, mut subscription: Option<Subscription>) {
        debug!("Actor::run: started");
        let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();
        self.timer_tx = Some(timer_tx);

        // Effects queued by mount (READY)
        self.flush().await;

        let mut shutdown_reply = None;
        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else {
                        debug!("Actor::run: all handles dropped");
                        break;
                    };
                    match self.apply(cmd) {
                        Step::Continue(reply) => {
                            self.flush().await;
                            reply();
                        }
                        Step::Stop(reply) => {
                            debug!("Actor::run: shutdown requested");
                            shutdown_reply = Some(reply);
                            break;
                        }
                    }
                }
                inbound = recv_inbound(&mut subscription) => {
                    match inbound {
                        Some(message) => {
                            self.planner.handle_inbound(message);
                            self.flush().await;
                        }
                        None => {
                            info!("Host link closed");
                            subscription = None;
                        }
                    }
                }
                Some(timer) = timer_rx.recv() => {
                    self.planner.fire(timer);
                    self.flush().await;
                }
                Some(_) = self.timers.join_next(), if !self.timers.is_empty() => {}
            }
        }

        self.teardown();
        // Unsubscribe from the host
        drop(subscription);
        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
        debug!("Actor::run: exiting");
    }

    /// Apply one command to the planner
    fn apply(&mut self, cmd: PlannerCommand) -> Step {
        let reply: DeferredReply = match cmd {
            PlannerCommand::AddItem { label, hours, reply } => {
                let result = self.planner.add_item(&label, hours).map_err(PlannerError::from);
                Box::new(move || {
                    let _ = reply.send(result);
                })
            }
            PlannerCommand::ToggleItem { id, reply } => {
                let found = self.planner.toggle_item(&id);
                Box::new(move || {
                    let _ = reply.send(Ok(found));
                })
            }
            PlannerCommand::RemoveItem { id, reply } => {
                let found = self.planner.remove_item(&id);
                Box::new(move || {
                    let _ = reply.send(Ok(found));
                })
            }
            PlannerCommand::Save { reply } => {
                self.planner.request_save();
                Box::new(move || {
                    let _ = reply.send(Ok(()));
                })
            }
            PlannerCommand::Shutdown { reply } => return Step::Stop(reply),
        };
        Step::Continue(reply)
    }

    /// Carry out queued effects and publish the new state
    async fn flush(&mut self) {
        for effect in self.planner.take_effects() {
            match effect {
                Effect::Post(message) => match &self.port {
                    Some(port) => {
                        if let Err(e) = port.post(&message).await {
                            warn!(kind = message.kind(), error = %e, "Failed to post to host");
                        }
                    }
                    None => debug!(kind = message.kind(), "Actor::flush: no host, dropping message"),
                },
                Effect::Schedule { after, timer } => {
                    let Some(tx) = self.timer_tx.clone() else {
                        continue;
                    };
                    debug!(?after, ?timer, "Actor::flush: scheduling timer");
                    self.timers.spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(timer);
                    });
                }
            }
        }
        self.snapshot_tx.send_replace(self.planner.state().clone());
    }

    /// Release timers
    fn teardown(&mut self) {
        debug!(timers = self.timers.len(), "Actor::teardown: called");
        self.planner.teardown();
        self.timers.abort_all();
        self.timer_tx = None;
        info!("Planner torn down");
    }
}

/// Next host message; never resolves without a subscription
async fn recv_inbound(subscription: &mut Option<Subscription>) -> Option<crate::protocol::Inbound> {
    match subscription.as_mut() {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

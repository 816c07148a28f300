//! TUI runner - main event loop
//!
//! Redraws whenever a key arrives or the planner publishes a new snapshot,
//! and forwards key actions to the planner actor.

use std::time::Duration;

use eyre::Result;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::planner::{PlannerError, PlannerManager, PlannerState};

use super::Tui;
use super::app::{Action, App};
use super::events::{Event, EventHandler};
use super::views;

const TICK_RATE: Duration = Duration::from_millis(250);

/// TUI runner that owns the terminal and the planner handle
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    manager: PlannerManager,
    snapshots: watch::Receiver<PlannerState>,
    event_handler: EventHandler,
}

impl TuiRunner {
    pub fn new(terminal: Tui, manager: PlannerManager) -> Self {
        debug!("TuiRunner::new: called");
        let snapshots = manager.subscribe();
        Self {
            app: App::new(),
            terminal,
            manager,
            snapshots,
            event_handler: EventHandler::new(TICK_RATE),
        }
    }

    /// Run until the user quits, then tear the planner down
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: called");
        let initial = self.snapshots.borrow_and_update().clone();
        self.app.state_mut().sync(initial);

        loop {
            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            tokio::select! {
                event = self.event_handler.next() => {
                    match event? {
                        Event::Key(key) => {
                            if let Some(action) = self.app.handle_key(key) {
                                self.dispatch(action).await?;
                            }
                        }
                        Event::Resize(width, height) => {
                            debug!(width, height, "TuiRunner::run: resize");
                        }
                        Event::Tick => {}
                    }
                }
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        warn!("Planner stopped publishing snapshots");
                        break;
                    }
                    let snapshot = self.snapshots.borrow_and_update().clone();
                    self.app.state_mut().sync(snapshot);
                }
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        info!("Closing planner");
        if let Err(e) = self.manager.shutdown().await {
            warn!(error = %e, "Planner shutdown failed");
        }
        Ok(())
    }

    async fn dispatch(&mut self, action: Action) -> Result<()> {
        debug!(?action, "TuiRunner::dispatch: called");
        let result = match action {
            Action::Add { label, hours } => match self.manager.add_item(label, hours).await {
                Ok(_) => {
                    self.app.state_mut().clear_form();
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Action::Toggle(id) => self.manager.toggle_item(&id).await.map(|_| ()),
            Action::Remove(id) => self.manager.remove_item(&id).await.map(|_| ()),
            Action::Save => self.manager.save().await,
        };

        match result {
            Ok(()) => {}
            // Rejection is already on the status line
            Err(PlannerError::InvalidItem(e)) => debug!(error = %e, "TuiRunner::dispatch: item rejected"),
            Err(e) => return Err(e.into()),
        }

        let snapshot = self.manager.snapshot();
        self.app.state_mut().sync(snapshot);
        Ok(())
    }
}

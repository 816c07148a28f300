//! TUI event handling
//!
//! Terminal input is read on a blocking thread and forwarded over a tokio
//! channel so the runner can `select!` on it alongside planner snapshots.

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind};
use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Terminal events
#[derive(Debug)]
pub enum Event {
    /// Key press (releases and repeats are filtered out)
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// No input within the tick interval
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Start polling the terminal, emitting a tick every `tick_rate` of idleness
    pub fn new(tick_rate: Duration) -> Self {
        debug!(?tick_rate, "EventHandler::new: called");
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            debug!("EventHandler: polling thread started");
            loop {
                let event = match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                        Ok(event::Event::Resize(w, h)) => Event::Resize(w, h),
                        Ok(_) => continue,
                        Err(e) => {
                            debug!(error = %e, "EventHandler: read failed, stopping");
                            break;
                        }
                    },
                    Ok(false) => Event::Tick,
                    Err(e) => {
                        debug!(error = %e, "EventHandler: poll failed, stopping");
                        break;
                    }
                };

                if tx.send(event).is_err() {
                    debug!("EventHandler: channel closed, stopping");
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Next terminal event
    pub async fn next(&mut self) -> Result<Event> {
        let event = self
            .rx
            .recv()
            .await
            .ok_or_else(|| eyre::eyre!("Terminal event channel closed"))?;
        trace!(?event, "EventHandler::next: received");
        Ok(event)
    }
}

//! Host link abstraction
//!
//! A widget talks to its host through two halves: a [`HostPort`] for posting
//! messages and a [`Subscription`] that yields inbound messages. Standalone
//! widgets have neither.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::protocol::{Inbound, Outbound, ProtocolError};

/// Errors from the host link
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Host I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Host protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Timed out connecting to host")]
    Timeout,

    #[error("Host link closed")]
    Closed,
}

/// Whether the widget has a host to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMode {
    /// Running inside a host, messages flow both ways
    Embedded,
    /// No host; saves are simulated
    #[default]
    Standalone,
}

impl std::fmt::Display for HostMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::Standalone => write!(f, "standalone"),
        }
    }
}

/// Outbound half of a host link
#[async_trait]
pub trait HostPort: Send + Sync {
    /// Deliver one message to the host
    ///
    /// Delivery is a notification; the host's reply, if any, arrives on the
    /// subscription.
    async fn post(&self, message: &Outbound) -> Result<(), HostError>;
}

/// Inbound half of a host link
///
/// Owns the task feeding it. Dropping the subscription stops that task, so a
/// torn-down widget never leaves a listener behind.
pub struct Subscription {
    rx: mpsc::Receiver<Inbound>,
    reader: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(rx: mpsc::Receiver<Inbound>, reader: Option<JoinHandle<()>>) -> Self {
        debug!(has_reader = reader.is_some(), "Subscription::new: called");
        Self { rx, reader }
    }

    /// Next inbound message, or `None` once the host side is gone
    pub async fn recv(&mut self) -> Option<Inbound> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            debug!("Subscription::drop: stopping reader task");
            reader.abort();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("has_reader", &self.reader.is_some())
            .finish()
    }
}

/// Everything the planner needs to reach its host
pub struct HostConnection {
    mode: HostMode,
    port: Option<Arc<dyn HostPort>>,
    subscription: Option<Subscription>,
}

impl HostConnection {
    /// No host at all
    pub fn standalone() -> Self {
        debug!("HostConnection::standalone: called");
        Self {
            mode: HostMode::Standalone,
            port: None,
            subscription: None,
        }
    }

    /// A live host link
    pub fn embedded(port: Arc<dyn HostPort>, subscription: Subscription) -> Self {
        debug!("HostConnection::embedded: called");
        Self {
            mode: HostMode::Embedded,
            port: Some(port),
            subscription: Some(subscription),
        }
    }

    pub fn mode(&self) -> HostMode {
        self.mode
    }

    /// Split into mode, outbound port and inbound subscription
    pub fn into_parts(self) -> (HostMode, Option<Arc<dyn HostPort>>, Option<Subscription>) {
        (self.mode, self.port, self.subscription)
    }
}

impl std::fmt::Debug for HostConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostConnection")
            .field("mode", &self.mode)
            .field("subscription", &self.subscription)
            .finish()
    }
}

//! Planner actor messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::ItemError;

/// Errors from planner operations
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Invalid item: {0}")]
    InvalidItem(#[from] ItemError),

    #[error("Channel error")]
    ChannelError,
}

/// Response from planner operations
pub type PlannerResponse<T> = Result<T, PlannerError>;

/// Commands sent to the planner actor
#[derive(Debug)]
pub enum PlannerCommand {
    AddItem {
        label: String,
        hours: Option<f64>,
        reply: oneshot::Sender<PlannerResponse<String>>,
    },
    ToggleItem {
        id: String,
        reply: oneshot::Sender<PlannerResponse<bool>>,
    },
    RemoveItem {
        id: String,
        reply: oneshot::Sender<PlannerResponse<bool>>,
    },
    Save {
        reply: oneshot::Sender<PlannerResponse<()>>,
    },

    // Shutdown; replies once timers and the host subscription are released
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

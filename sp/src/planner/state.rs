//! Planner state
//!
//! Pure data. Everything the view needs to draw the widget is here, so a
//! snapshot can be rendered without asking the planner anything else.

use serde::Serialize;
use tracing::trace;

use crate::domain::{AuthInfo, Hours, WorkItem};
use crate::host::HostMode;

use super::machine::SaveMode;

/// Where the widget is in the host handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakePhase {
    /// READY sent (or not yet mounted), waiting for USER_INFO
    #[default]
    AwaitingAuth,
    /// Auth received, or standalone
    Ready,
}

/// Snapshot of the widget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerState {
    pub mode: HostMode,
    pub phase: HandshakePhase,
    pub auth: Option<AuthInfo>,
    /// Insertion ordered
    pub items: Vec<WorkItem>,
    pub is_loading: bool,
    pub is_saving: bool,
    /// Empty when nothing to show
    pub status_message: String,

    // Presentation hints carried from settings
    pub save_mode: SaveMode,
    pub track_hours: bool,
    pub default_hours: Hours,
    pub noun: String,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            mode: HostMode::default(),
            phase: HandshakePhase::default(),
            auth: None,
            items: Vec::new(),
            is_loading: true,
            is_saving: false,
            status_message: String::new(),
            save_mode: SaveMode::default(),
            track_hours: true,
            default_hours: Hours::default(),
            noun: "subject".to_string(),
        }
    }
}

impl PlannerState {
    /// Header line identifying the user
    ///
    /// Standalone widgets and hosts that send no email show "Test Mode".
    pub fn user_label(&self) -> String {
        trace!("PlannerState::user_label: called");
        match self.auth.as_ref().and_then(|a| a.email.as_deref()) {
            Some(email) => format!("User: {}", email),
            None => "Test Mode".to_string(),
        }
    }

    /// Find an item by ID
    pub fn find(&self, id: &str) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether an explicit save makes sense right now
    pub fn can_save(&self) -> bool {
        !self.items.is_empty() && !self.is_saving
    }

    /// Completed and total item counts
    pub fn progress(&self) -> (usize, usize) {
        let done = self.items.iter().filter(|item| item.completed).count();
        (done, self.items.len())
    }

    /// Sum of planned hours across items that have them
    pub fn total_hours(&self) -> f64 {
        self.items.iter().filter_map(|item| item.hours).map(Hours::get).sum()
    }
}

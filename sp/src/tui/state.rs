//! TUI application state
//!
//! Pure data structures for the TUI. No rendering logic here.
//! The planner snapshot is owned by the planner actor; this adds what only
//! the view cares about (selection, focus, form inputs).

use tracing::debug;

use crate::planner::PlannerState;

/// Which part of the widget receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Item list navigation
    #[default]
    List,
    /// Label input of the add form
    Label,
    /// Hours input of the add form
    Hours,
}

/// Add form inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub label: String,
    pub hours: String,
}

impl FormState {
    /// Empty label, hours pre-filled from the planner defaults
    pub fn reset_from(planner: &PlannerState) -> Self {
        Self {
            label: String::new(),
            hours: planner.default_hours.get().to_string(),
        }
    }
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Latest planner snapshot
    pub planner: PlannerState,
    /// Selected row in the item list
    pub selected: usize,
    pub focus: Focus,
    pub form: FormState,
    pub show_help: bool,
    pub should_quit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        debug!("AppState::new: called");
        let planner = PlannerState::default();
        let form = FormState::reset_from(&planner);
        Self {
            planner,
            selected: 0,
            focus: Focus::default(),
            form,
            show_help: false,
            should_quit: false,
        }
    }

    /// Take a new planner snapshot, keeping the selection in range
    pub fn sync(&mut self, planner: PlannerState) {
        let defaults_changed = planner.default_hours != self.planner.default_hours;
        self.planner = planner;
        if defaults_changed && self.form.label.is_empty() {
            self.form = FormState::reset_from(&self.planner);
        }
        self.clamp_selection();
    }

    /// ID of the highlighted item
    pub fn selected_id(&self) -> Option<&str> {
        self.planner.items.get(self.selected).map(|item| item.id.as_str())
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.planner.items.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Clear the add form after a successful add
    pub fn clear_form(&mut self) {
        debug!("AppState::clear_form: called");
        self.form = FormState::reset_from(&self.planner);
        self.focus = Focus::Label;
    }

    fn clamp_selection(&mut self) {
        let len = self.planner.items.len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

//! TUI application - keyboard handling
//!
//! The App owns the AppState and turns key presses into planner actions.
//! It does not talk to the planner itself; the runner dispatches actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, trace};

use super::state::{AppState, Focus};

/// Something the planner should do in response to a key press
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add { label: String, hours: Option<f64> },
    Toggle(String),
    Remove(String),
    Save,
}

/// TUI application
#[derive(Debug, Default)]
pub struct App {
    state: AppState,
}

impl App {
    pub fn new() -> Self {
        debug!("App::new: called");
        Self { state: AppState::new() }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Handle a key press, returning the planner action it asks for
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        trace!(?key, focus = ?self.state.focus, "App::handle_key: called");
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return None;
        }

        if self.state.planner.is_loading {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.state.should_quit = true;
            }
            return None;
        }

        if self.state.show_help {
            self.state.show_help = false;
            return None;
        }

        match self.state.focus {
            Focus::List => self.handle_list_key(key),
            Focus::Label | Focus::Hours => self.handle_form_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state.should_quit = true;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.select_prev();
                None
            }
            KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Tab => {
                self.state.focus = Focus::Label;
                None
            }
            KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => {
                self.state.selected_id().map(|id| Action::Toggle(id.to_string()))
            }
            KeyCode::Char('d') | KeyCode::Delete => self.state.selected_id().map(|id| Action::Remove(id.to_string())),
            KeyCode::Char('s') if self.state.planner.can_save() => Some(Action::Save),
            KeyCode::Char('?') => {
                self.state.show_help = true;
                None
            }
            _ => None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.state.focus = Focus::List;
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.state.focus = self.next_focus(key.code == KeyCode::BackTab);
                None
            }
            KeyCode::Enter => Some(self.submit()),
            KeyCode::Backspace => {
                self.focused_input().pop();
                None
            }
            KeyCode::Char(c) => {
                let hours_field = self.state.focus == Focus::Hours;
                if !hours_field || c.is_ascii_digit() || c == '.' {
                    self.focused_input().push(c);
                }
                None
            }
            _ => None,
        }
    }

    fn next_focus(&self, backwards: bool) -> Focus {
        let track_hours = self.state.planner.track_hours;
        match (self.state.focus, backwards) {
            (Focus::Label, false) if track_hours => Focus::Hours,
            (Focus::Label, true) => Focus::List,
            (Focus::Hours, true) => Focus::Label,
            _ => Focus::List,
        }
    }

    fn focused_input(&mut self) -> &mut String {
        match self.state.focus {
            Focus::Hours => &mut self.state.form.hours,
            _ => &mut self.state.form.label,
        }
    }

    /// Build an add action from the form
    ///
    /// Unparseable hours are passed through as NaN so the planner reports
    /// them the same way as any other invalid value.
    fn submit(&self) -> Action {
        let form = &self.state.form;
        let hours = if self.state.planner.track_hours {
            let raw = form.hours.trim();
            if raw.is_empty() {
                Some(self.state.planner.default_hours.get())
            } else {
                Some(raw.parse::<f64>().unwrap_or(f64::NAN))
            }
        } else {
            None
        };
        Action::Add {
            label: form.label.clone(),
            hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkItem;
    use crate::planner::PlannerState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn loaded_app(items: &[&str]) -> App {
        let mut app = App::new();
        app.state_mut().sync(PlannerState {
            is_loading: false,
            items: items
                .iter()
                .enumerate()
                .map(|(i, label)| WorkItem::with_id(i.to_string(), *label))
                .collect(),
            ..Default::default()
        });
        app
    }

    #[test]
    fn test_only_quit_while_loading() {
        let mut app = App::new();
        assert_eq!(app.handle_key(key(KeyCode::Char('a'))), None);
        assert_eq!(app.state().focus, Focus::List);

        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.state().should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_form() {
        let mut app = loaded_app(&[]);
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.state().should_quit);
        assert_eq!(app.state().form.label, "");
    }

    #[test]
    fn test_add_from_form() {
        let mut app = loaded_app(&[]);
        app.handle_key(key(KeyCode::Char('a')));
        type_str(&mut app, "Math");
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state().focus, Focus::Hours);
        app.handle_key(key(KeyCode::Backspace));
        type_str(&mut app, "2.5h");

        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            action,
            Some(Action::Add {
                label: "Math".to_string(),
                hours: Some(2.5)
            })
        );
    }

    #[test]
    fn test_add_with_bad_hours_passes_nan() {
        let mut app = loaded_app(&[]);
        app.state_mut().focus = Focus::Hours;
        app.state_mut().form.hours = "1.2.3".to_string();
        match app.handle_key(key(KeyCode::Enter)) {
            Some(Action::Add { hours: Some(h), .. }) => assert!(h.is_nan()),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_add_without_hours_tracking() {
        let mut app = loaded_app(&[]);
        app.state_mut().planner.track_hours = false;
        app.handle_key(key(KeyCode::Char('a')));
        type_str(&mut app, "Art");
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state().focus, Focus::List);

        app.state_mut().focus = Focus::Label;
        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            action,
            Some(Action::Add {
                label: "Art".to_string(),
                hours: None
            })
        );
    }

    #[test]
    fn test_list_actions_target_selection() {
        let mut app = loaded_app(&["Math", "Art"]);
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(
            app.handle_key(key(KeyCode::Char(' '))),
            Some(Action::Toggle("1".to_string()))
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('d'))),
            Some(Action::Remove("1".to_string()))
        );
    }

    #[test]
    fn test_list_actions_on_empty_list() {
        let mut app = loaded_app(&[]);
        assert_eq!(app.handle_key(key(KeyCode::Char(' '))), None);
        assert_eq!(app.handle_key(key(KeyCode::Char('d'))), None);
        assert_eq!(app.handle_key(key(KeyCode::Char('s'))), None);
    }

    #[test]
    fn test_save_needs_items() {
        let mut app = loaded_app(&["Math"]);
        assert_eq!(app.handle_key(key(KeyCode::Char('s'))), Some(Action::Save));

        app.state_mut().planner.is_saving = true;
        assert_eq!(app.handle_key(key(KeyCode::Char('s'))), None);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = loaded_app(&["Math"]);
        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.state().show_help);
        assert_eq!(app.handle_key(key(KeyCode::Char('d'))), None);
        assert!(!app.state().show_help);
    }

    #[test]
    fn test_hours_field_accepts_only_numbers() {
        let mut app = loaded_app(&[]);
        app.state_mut().focus = Focus::Hours;
        app.state_mut().form.hours.clear();
        type_str(&mut app, "a1b.5");
        assert_eq!(app.state().form.hours, "1.5");
    }
}

//! Terminal front-end for the planner widget
//!
//! Shows the header with the signed-in user, the add form, the item list
//! with checkboxes and the status line. Keys:
//! - `a`/`Tab` to add, `Enter` to submit
//! - `j`/`k` to move, `space` to toggle, `d` to remove
//! - `s` to save when saving is manual

mod app;
mod events;
mod runner;
pub mod state;
mod views;

pub use app::{Action, App};
pub use events::{Event, EventHandler};
pub use runner::TuiRunner;
pub use state::{AppState, Focus, FormState};

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::planner::PlannerManager;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Put the terminal into raw mode on the alternate screen
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the widget against a spawned planner until the user quits
pub async fn run(manager: PlannerManager) -> Result<()> {
    let terminal = init()?;

    // Restore the terminal even on early return or error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let mut runner = TuiRunner::new(terminal, manager);
    runner.run().await
}

//! TUI views and rendering
//!
//! Draws the widget from AppState. Never modifies state.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use tracing::trace;

use crate::host::HostMode;
use crate::planner::SaveMode;

use super::state::{AppState, Focus};

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const DONE: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const PENDING: Color = Color::Rgb(255, 215, 0); // Gold
    pub const STATUS: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const FOCUSED: Color = Color::Rgb(255, 215, 0); // Gold
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const DIM: Color = Color::DarkGray;
}

pub const LOADING_TEXT: &str = "Loading...";
pub const EMPTY_TEXT: &str = "No items yet. Add your first study task above.";
pub const TITLE: &str = "Study Planner";

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame) {
    trace!(loading = state.planner.is_loading, "render: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(3)])
        .split(frame.area());

    render_header(state, frame, chunks[0]);

    if state.planner.is_loading {
        let loading = Paragraph::new(Line::from(Span::styled(LOADING_TEXT, Style::default().fg(colors::DIM))))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(loading, chunks[1]);
    } else {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(chunks[1]);
        render_form(state, frame, body[0]);
        render_items(state, frame, body[1]);
    }

    render_footer(state, frame, chunks[2]);

    if state.show_help {
        render_help(frame);
    }
}

fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    let planner = &state.planner;
    let mut spans = vec![Span::styled(
        format!("{} ", TITLE),
        Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
    )];

    // Who is signed in is unknown until the host answers
    if !planner.is_loading || planner.mode == HostMode::Standalone {
        spans.push(Span::raw("│ "));
        spans.push(Span::raw(planner.user_label()));
    }

    if planner.mode == HostMode::Standalone {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("standalone", Style::default().fg(colors::DIM)));
    }

    if !planner.is_loading && !planner.items.is_empty() {
        let (done, total) = planner.progress();
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{}/{} done", done, total),
            Style::default().fg(colors::DONE),
        ));
        if planner.track_hours {
            spans.push(Span::raw(" │ "));
            spans.push(Span::styled(
                format!("{}h planned", planner.total_hours()),
                Style::default().fg(colors::PENDING),
            ));
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn input_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(colors::FOCUSED)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).title(title).border_style(style)
}

fn render_form(state: &AppState, frame: &mut Frame, area: Rect) {
    let planner = &state.planner;
    let constraints = if planner.track_hours {
        vec![Constraint::Min(10), Constraint::Length(14)]
    } else {
        vec![Constraint::Min(10)]
    };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let label_focused = state.focus == Focus::Label;
    let label = Paragraph::new(state.form.label.as_str())
        .block(input_block(format!(" New {} ", planner.noun), label_focused));
    frame.render_widget(label, chunks[0]);

    if planner.track_hours {
        let hours_focused = state.focus == Focus::Hours;
        let hours = Paragraph::new(state.form.hours.as_str()).block(input_block(" Hours ".to_string(), hours_focused));
        frame.render_widget(hours, chunks[1]);
    }
}

fn render_items(state: &AppState, frame: &mut Frame, area: Rect) {
    let planner = &state.planner;
    let block = Block::default().borders(Borders::ALL).title(" Study Plan ");

    if planner.items.is_empty() {
        let empty = Paragraph::new(Span::styled(EMPTY_TEXT, Style::default().fg(colors::DIM)))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let list_focused = state.focus == Focus::List;
    let rows: Vec<ListItem> = planner
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let (mark, mark_color) = if item.completed {
                ("[x] ", colors::DONE)
            } else {
                ("[ ] ", colors::PENDING)
            };
            let label_style = if item.completed {
                Style::default().fg(colors::DIM).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            let mut spans = vec![
                Span::styled(mark, Style::default().fg(mark_color)),
                Span::styled(item.label.clone(), label_style),
            ];
            if planner.track_hours
                && let Some(hours) = item.hours
            {
                spans.push(Span::styled(format!("  {}", hours), Style::default().fg(colors::DIM)));
            }

            let row = ListItem::new(Line::from(spans));
            if list_focused && i == state.selected {
                row.style(Style::default().bg(colors::SELECTED_BG).add_modifier(Modifier::BOLD))
            } else {
                row
            }
        })
        .collect();

    frame.render_widget(List::new(rows).block(block), area);
}

fn keybind(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)),
        Span::raw(label),
    ]
}

fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let planner = &state.planner;
    let mut spans = Vec::new();

    if !planner.status_message.is_empty() {
        spans.push(Span::styled(
            format!("{} ", planner.status_message),
            Style::default().fg(colors::STATUS).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw("│"));
    }

    match state.focus {
        Focus::List => {
            spans.extend(keybind(" a", " Add "));
            spans.extend(keybind(" space", " Toggle "));
            spans.extend(keybind(" d", " Remove "));
            if planner.save_mode == SaveMode::Manual && !planner.items.is_empty() {
                if planner.is_saving {
                    spans.push(Span::styled(" Saving... ", Style::default().fg(colors::DIM)));
                } else {
                    spans.extend(keybind(" s", " Save Study Plan "));
                }
            }
            spans.extend(keybind(" ?", " Help "));
            spans.extend(keybind(" q", " Quit "));
        }
        Focus::Label | Focus::Hours => {
            spans.extend(keybind(" Enter", " Add "));
            spans.extend(keybind(" Tab", " Next field "));
            spans.extend(keybind(" Esc", " Back "));
        }
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    let lines = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("a / Tab      focus the add form"),
        Line::from("Enter        add item (in form)"),
        Line::from("j / k        move selection"),
        Line::from("space / x    toggle completed"),
        Line::from("d / Delete   remove item"),
        Line::from("s            save (manual mode)"),
        Line::from("q / Esc      quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(colors::DIM))),
    ];
    let help = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Help "));
    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

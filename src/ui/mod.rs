//! User interface components.
//!
//! Provides TUI widgets and drawing functions for the application's
//! terminal-based user interface using ratatui.

mod form;
mod trip_list;
mod trip_view;

pub use form::draw_form;
pub use trip_list::draw_trip_list;
pub use trip_view::draw_trip_view;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::types::Tab;

/// Render the full application UI to the terminal frame.
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3), // Command/status bar at bottom
        ])
        .split(f.size());

    if app.nav.trip().is_some() {
        draw_trip_view(f, app, chunks[0]);
    } else {
        draw_trip_list(f, app, chunks[0]);
    }

    draw_command_bar(f, app, chunks[1]);

    if let Some(form) = &app.form {
        draw_form(f, form);
        return;
    }

    if let Some(event) = &app.pending_delete {
        draw_status_message(f, &format!("Delete \"{}\"? (y/n)", event.title), "Confirm");
        return;
    }

    // Blocking modals
    if let Some(status) = &app.status_message {
        draw_status_message(f, status, "Info");
        return;
    }
    if let Some(error) = &app.error_message {
        draw_error_message(f, error);
        return;
    }

    if app.show_help {
        draw_help_modal(f, app);
    }
}

fn draw_command_bar(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.is_global_command_mode { "Command" } else { "Commands/Status" };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(title, Style::default().fg(Color::Yellow)));

    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1)])
        .margin(1)
        .split(area)[0];

    if app.is_global_command_mode {
        let command = Paragraph::new(format!(" :{}", app.global_command_buffer))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(command, inner_area);
        return;
    }

    let mut text = match app.nav.tab() {
        None => create_help_text(&[
            ("Enter", "Open"),
            ("a", "New trip"),
            (":reload", "Reload"),
            (":q", "Quit"),
        ]),
        Some(Tab::Schedule) => create_help_text(&[
            ("Esc", "Back"),
            ("Tab", "Next tab"),
            ("a", "Add"),
            ("d", "Delete"),
        ]),
        Some(Tab::Planning) => create_help_text(&[
            ("Esc", "Back"),
            ("Tab", "Next tab"),
            ("a", "Add"),
            ("Space", "Toggle"),
        ]),
        Some(Tab::Expense) => create_help_text(&[("Esc", "Back"), ("Tab", "Next tab"), ("a", "Add")]),
        Some(Tab::Bookings) => create_help_text(&[("Esc", "Back"), ("Tab", "Next tab")]),
    };
    if app.is_loading() {
        text.push(Span::styled(" | Syncing...", Style::default().fg(Color::Cyan)));
    }

    f.render_widget(
        Paragraph::new(Line::from(text)).style(Style::default().fg(Color::Gray)),
        inner_area,
    );
}

/// Build styled help text spans from key-description pairs for the command bar.
pub fn create_help_text<'a>(commands: &[(&'a str, &'a str)]) -> Vec<Span<'a>> {
    let mut text = vec![Span::raw(" ")];

    for (i, (key, description)) in commands.iter().enumerate() {
        text.push(Span::styled(*key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
        text.push(Span::raw(format!(": {description}")));
        if i < commands.len() - 1 {
            text.push(Span::raw(" | "));
        }
    }

    text
}

/// Create a bordered block with a title, highlighted when focused.
pub fn create_titled_block(title: &str, is_focused: bool) -> Block<'_> {
    let (title_style, border_style) = if is_focused {
        (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Yellow),
        )
    } else {
        (Style::default(), Style::default())
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// A rectangle of at most `width` x `height`, centered in `outer`.
pub fn centered_rect(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width.saturating_sub(4));
    let height = height.min(outer.height.saturating_sub(2));
    Rect {
        x: outer.x + (outer.width.saturating_sub(width)) / 2,
        y: outer.y + (outer.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn draw_error_message(f: &mut Frame, message: &str) {
    let area = centered_rect(f.size(), 50, 7);

    let block = Block::default()
        .title(Span::styled("Error", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .style(Style::default().bg(Color::Black));

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(area);

    f.render_widget(text, inner_area[0]);
    f.render_widget(
        Paragraph::new("Press Esc to dismiss")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        inner_area[1],
    );
}

#[allow(clippy::cast_possible_truncation)]
fn draw_status_message(f: &mut Frame, message: &str, title: &str) {
    use unicode_width::UnicodeWidthStr;
    let size = f.size();

    // Max 80% of screen, min 40
    let max_width = (size.width as usize * 80) / 100;
    let width = message.width().saturating_add(6).min(max_width).max(40) as u16;

    let inner_width = width.saturating_sub(4) as usize;
    let msg_lines = message.width().div_ceil(inner_width.max(1));
    let height = msg_lines as u16 + 4;
    let area = centered_rect(size, width, height);

    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(area);

    f.render_widget(text, inner_area[0]);
    f.render_widget(
        Paragraph::new("Press Esc to dismiss")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        inner_area[1],
    );
}

fn draw_help_modal(f: &mut Frame, app: &App) {
    let area = centered_rect(f.size(), 56, 22);

    let block = Block::default()
        .title(Span::styled(" Help - Keybindings ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let inner_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1)])
        .margin(1)
        .split(area)[0];

    let help_text: Vec<Line> = build_help_content(app)
        .into_iter()
        .map(|(key, desc, is_header)| {
            if is_header {
                Line::from(Span::styled(key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)))
            } else {
                Line::from(vec![
                    Span::styled(format!("{key:>12}"), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::styled(desc, Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    f.render_widget(Paragraph::new(help_text).wrap(Wrap { trim: true }), inner_area);
}

fn build_help_content(app: &App) -> Vec<(&'static str, &'static str, bool)> {
    let mut lines = vec![
        ("── Global ──", "", true),
        ("F1 / ?", "Show this help", false),
        (":", "Enter command mode", false),
        (":q / :quit", "Quit application", false),
        (":reload", "Reload data from the store", false),
        ("Esc", "Go back / dismiss modal", false),
        ("", "", false),
    ];

    if app.nav.trip().is_some() {
        lines.extend([
            ("── Trip ──", "", true),
            ("Tab / →", "Next tab", false),
            ("S-Tab / ←", "Previous tab", false),
            ("1-4", "Jump to tab", false),
            ("↑/↓ or j/k", "Move selection", false),
            ("a", "Add to this tab", false),
            ("d", "Delete schedule item", false),
            ("Space", "Toggle to-do", false),
        ]);
    } else {
        lines.extend([
            ("── Trips ──", "", true),
            ("↑/↓ or j/k", "Move selection", false),
            ("Enter", "Open trip", false),
            ("a", "Create trip", false),
        ]);
    }

    lines.push(("", "", false));
    lines.push(("Press Esc, F1 or ? to close", "", true));
    lines
}

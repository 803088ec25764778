use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::constants::ui::FORM_WIDTH;
use crate::input::Form;
use crate::ui::{centered_rect, create_help_text};

/// Modal for an in-progress record.
#[allow(clippy::cast_possible_truncation)]
pub fn draw_form(f: &mut Frame, form: &Form) {
    // Two rows per field, a message row and the help row
    let height = form.fields().len() as u16 * 2 + 4;
    let area = centered_rect(f.size(), FORM_WIDTH, height);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", form.title()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = form.fields().iter().map(|_| Constraint::Length(2)).collect();
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(area);

    for (i, field) in form.fields().iter().enumerate() {
        let focused = i == form.focus();
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if field.required { "*" } else { "" };
        let cursor = if focused { "_" } else { "" };

        let lines = vec![
            Line::from(Span::styled(format!("{}{marker}", field.label), label_style)),
            Line::from(Span::styled(format!("> {}{cursor}", field.value), Style::default().fg(Color::White))),
        ];
        f.render_widget(Paragraph::new(lines), rows[i]);
    }

    let count = form.fields().len();
    if let Some(message) = &form.message {
        f.render_widget(
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red)),
            rows[count],
        );
    }

    let help = create_help_text(&[("Enter", "Next/Save"), ("Tab", "Field"), ("Esc", "Cancel")]);
    f.render_widget(Paragraph::new(Line::from(help)), rows[count + 1]);
}

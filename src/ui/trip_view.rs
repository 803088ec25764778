use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::constants::ui::{HEADER_HEIGHT, TAB_BAR_HEIGHT};
use crate::types::Tab;
use crate::ui::create_titled_block;
use crate::views;

/// Header, tab bar and the active tab's content.
pub fn draw_trip_view(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(tab) = app.nav.tab() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Min(1),
        ])
        .split(area);

    draw_header(f, app, chunks[0]);
    draw_tab_bar(f, tab, chunks[1]);

    match tab {
        Tab::Schedule => draw_schedule(f, app, chunks[2]),
        Tab::Expense => draw_expenses(f, app, chunks[2]),
        Tab::Planning => draw_todos(f, app, chunks[2]),
        Tab::Bookings => draw_bookings(f, chunks[2]),
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let (emoji, title, start) = app.current_trip.as_ref().map_or(("", "Trip", ""), |t| {
        (t.cover_emoji.as_str(), t.title.as_str(), t.start_date.as_str())
    });

    let line = Line::from(vec![
        Span::raw(format!(" {emoji} ")),
        Span::styled(title, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {start}"), Style::default().fg(Color::Gray)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_tab_bar(f: &mut Frame, tab: Tab, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| Line::from(format!("{} {}", t.index() + 1, t.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn titled(label: &str, loading: bool) -> String {
    if loading { format!("{label} (syncing...)") } else { label.to_string() }
}

fn draw_empty(f: &mut Frame, block: Block<'_>, message: &str, area: Rect) {
    f.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn highlight() -> Style {
    Style::default().bg(Color::Rgb(80, 80, 120)).add_modifier(Modifier::BOLD)
}

fn draw_schedule(f: &mut Frame, app: &mut App, area: Rect) {
    let events = app.events();
    let title = titled("Schedule", app.is_loading());
    let block = create_titled_block(&title, true);

    if events.is_empty() {
        draw_empty(f, block, "Nothing scheduled. Press 'a' to add.", area);
        return;
    }

    let items: Vec<ListItem> = events
        .iter()
        .map(|event| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:>5} ", event.time), Style::default().fg(Color::Cyan)),
                Span::styled(event.title.clone(), Style::default().fg(Color::White)),
                Span::styled(format!("  @ {}", event.location), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(highlight());
    f.render_stateful_widget(list, area, &mut app.row_list_state);
}

fn draw_expenses(f: &mut Frame, app: &mut App, area: Rect) {
    let expenses = app.expenses();
    let total = views::total(&expenses);
    let title = titled("Expenses", app.is_loading());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let total_line = Line::from(vec![
        Span::raw(" Total spent: "),
        Span::styled(views::format_amount(total), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
    ]);
    f.render_widget(
        Paragraph::new(total_line).block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    let block = create_titled_block(&title, true);
    if expenses.is_empty() {
        draw_empty(f, block, "No expenses yet. Press 'a' to add.", chunks[1]);
        return;
    }

    let items: Vec<ListItem> = expenses
        .iter()
        .map(|expense| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:>12} ", views::format_amount(expense.amount)), Style::default().fg(Color::Green)),
                Span::styled(expense.item.clone(), Style::default().fg(Color::White)),
                Span::styled(format!("  paid by {}", expense.payer), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(highlight());
    f.render_stateful_widget(list, chunks[1], &mut app.row_list_state);
}

fn draw_todos(f: &mut Frame, app: &mut App, area: Rect) {
    let todos = app.todos();
    let (done, all) = views::progress(&todos);
    let title = titled(&format!("Planning {done}/{all}"), app.is_loading());
    let block = create_titled_block(&title, true);

    if todos.is_empty() {
        draw_empty(f, block, "No to-dos yet. Press 'a' to add.", area);
        return;
    }

    let items: Vec<ListItem> = todos
        .iter()
        .map(|todo| {
            let (mark, style) = if todo.done {
                ("[x] ", Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT))
            } else {
                ("[ ] ", Style::default().fg(Color::White))
            };
            ListItem::new(Line::from(vec![Span::raw(" "), Span::raw(mark), Span::styled(todo.text.clone(), style)]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(highlight());
    f.render_stateful_widget(list, area, &mut app.row_list_state);
}

fn draw_bookings(f: &mut Frame, area: Rect) {
    let block = create_titled_block("Bookings", true);
    draw_empty(f, block, "Flights and hotels are not tracked here yet.", area);
}

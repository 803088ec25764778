use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::create_titled_block;

/// Trips, newest first.
pub fn draw_trip_list(f: &mut Frame, app: &mut App, area: Rect) {
    let trips = app.trips();
    let loading = app.is_loading();
    let title = if loading { "My Trips (syncing...)" } else { "My Trips" };
    let block = create_titled_block(title, true);

    if trips.is_empty() {
        let message = if loading { "Loading..." } else { "No trips yet. Press 'a' to create one." };
        f.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let selected = app.trip_list_state.selected();
    let items: Vec<ListItem> = trips
        .iter()
        .enumerate()
        .map(|(i, trip)| {
            let (prefix, text_style) = if Some(i) == selected {
                ("> ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default().fg(Color::White))
            };
            let title = if trip.title.is_empty() { "Untitled trip" } else { &trip.title };

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::raw(format!("{} ", trip.cover_emoji)),
                Span::styled(title.to_string(), text_style),
                Span::styled(format!("  {}", trip.start_date), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(80, 80, 120)).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(list, area, &mut app.trip_list_state);
}

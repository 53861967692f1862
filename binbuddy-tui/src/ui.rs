use binbuddy_core::{entity::ENTITIES, model::WasteStream, refresh::CycleState};
use chrono::{Days, Local, NaiveDate};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(format!("Bin Buddy – {}", app.plugin.meta.name))
        .block(Block::default().borders(Borders::ALL).title("Bin Buddy"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::AddressSearch => draw_address_search(frame, app, *content_area),
        Screen::DatesView => draw_dates_view(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::AddressSearch => {
            "Type to edit · Enter search · Tab/→ use address · ↑/↓ move · Esc/Ctrl-C quit"
        }
        Screen::DatesView => "r refresh now · c change address · q/Esc/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_address_search(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Min(0),    // results
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, results_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.address_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search address (e.g. 1 Flushcombe Rd, Enter)"),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(input, *input_area);

    let items = if app.candidates.is_empty() {
        vec![ListItem::new("No results yet. Type a street address and press Enter.")]
    } else {
        app.candidates
            .iter()
            .map(|candidate| ListItem::new(candidate.label.clone()))
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Addresses (↑/↓, Tab/→ to use)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.candidates.is_empty() {
        state.select(Some(app.candidate_index));
    }
    frame.render_stateful_widget(list, *results_area, &mut state);
}

fn draw_dates_view(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(coordinator) = app.coordinator.as_ref() else {
        return;
    };

    let refreshed = app.last_refreshed.map_or_else(
        || "never".to_owned(),
        |at| at.format("%d/%m/%Y %H:%M").to_string(),
    );
    let title = format!(
        "{} · {} · refreshed {refreshed}",
        coordinator.entry().title,
        state_label(coordinator.state())
    );

    if app.last_refreshed.is_none() {
        let text = if coordinator.state() == CycleState::Failed {
            "Could not load collection dates yet. Press r to retry."
        } else {
            "Loading collection dates…"
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let today = Local::now().date_naive();

    // Every stream gets a row; streams without an entity show as unknown.
    let rows = ENTITIES.into_iter().map(|description| {
        let entity = app
            .entities
            .iter()
            .find(|entity| entity.description().stream == description.stream);
        let date = entity.and_then(|entity| entity.native_value(coordinator));

        let (date_cell, weekday, relative) = match date {
            Some(date) => (
                date.format("%d/%m/%Y").to_string(),
                date.format("%a").to_string(),
                relative_day_label(date, today),
            ),
            None => ("unknown".to_owned(), String::new(), String::new()),
        };

        let mut style = Style::default().fg(stream_color(description.stream));
        if date.is_some_and(|date| date <= today + Days::new(1)) {
            style = style.add_modifier(Modifier::BOLD);
        }

        Row::new(vec![
            Cell::from(description.name),
            Cell::from(date_cell),
            Cell::from(weekday),
            Cell::from(relative),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Min(22),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Bin", "Next", "Day", "In"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn state_label(state: CycleState) -> &'static str {
    match state {
        CycleState::Idle => "waiting",
        CycleState::Fetching => "refreshing",
        CycleState::Success => "up to date",
        CycleState::Failed => "update failed",
    }
}

fn stream_color(stream: WasteStream) -> Color {
    match stream {
        WasteStream::General => Color::Red,
        WasteStream::Recycling => Color::Yellow,
        WasteStream::Organics => Color::Green,
    }
}

fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    let delta = (date - today).num_days();
    match delta {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        days if days > 1 => format!("in {days} days"),
        -1 => "yesterday".to_owned(),
        days => format!("{} days ago", days.abs()),
    }
}

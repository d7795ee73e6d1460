//! UI rendering helpers for the terminal user interface.
//!
//! The starfield is painted first over the whole frame, then the player
//! panel, the optional playlist and the start overlay on top of it.

mod starfield_layer;

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph},
};

use crate::app::App;
use crate::audio::{PlaybackState, format_time};
use crate::config::Settings;

pub use starfield_layer::StarfieldLayer;

const PANEL_HEIGHT: u16 = 6;

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_seconds: u64) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] seek -/+{seek_seconds}s"),
        "[+/-] volume".to_string(),
        "[tab] playlist".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

/// Split `width` cells into (played, buffered) counts. Buffered is never
/// less than played.
fn progress_cells(width: u16, state: &PlaybackState) -> (u16, u16) {
    let w = f64::from(width);
    let played = if state.duration > 0.0 {
        (state.position / state.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let loaded = f64::from(state.loaded_percentage.clamp(0.0, 100.0)) / 100.0;
    let played = (played * w).round() as u16;
    let loaded = ((loaded * w).round() as u16).max(played);
    (played.min(width), loaded.min(width))
}

fn progress_line(width: u16, state: &PlaybackState) -> Line<'static> {
    let (played, loaded) = progress_cells(width, state);
    Line::from(vec![
        Span::styled("━".repeat(played as usize), Style::default().fg(Color::White)),
        Span::styled(
            "─".repeat((loaded - played) as usize),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            "┈".repeat((width - loaded) as usize),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn status_line(state: &PlaybackState) -> String {
    let transport = if state.playing { "▶ playing" } else { "⏸ paused" };
    format!(
        "{} / {}   {}   vol {:.0}%",
        format_time(state.position),
        format_time(state.duration),
        transport,
        state.volume * 100.0
    )
}

fn draw_player(frame: &mut Frame, app: &App, area: Rect, settings: &Settings) {
    let state = app.controller.state();
    let track = app.controller.playlist().get(state.index);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(settings.ui.header_text.as_str())
        .title_alignment(Alignment::Center)
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        });
    let inner = block.inner(area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let title = match track {
        Some(t) if t.artist.is_empty() => Line::from(Span::styled(t.title.clone(), bold)),
        Some(t) => Line::from(vec![
            Span::styled(t.title.clone(), bold),
            Span::raw("  "),
            Span::styled(t.artist.clone(), Style::default().fg(Color::Gray)),
        ]),
        None => Line::from("nothing to play".italic()),
    };

    let mut status = status_line(state);
    if app.controller.is_fetching() {
        status.push_str("   loading…");
    }
    if app.controller.needs_output() {
        status.push_str("   (no audio device)");
    }

    let lines = vec![
        title,
        progress_line(inner.width, state),
        Line::from(status),
        Line::from(Span::styled(
            controls_text(settings.audio.seek_seconds),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let playlist = app.controller.playlist();
    let playing = app.controller.state().index;

    let items: Vec<ListItem> = playlist
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if i == playing { "♪ " } else { "  " };
            ListItem::new(format!("{marker}{}", t.display()))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" playlist "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !playlist.is_empty() {
        state.select(Some(app.selected));
    }

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_start_gate(frame: &mut Frame, area: Rect) {
    let popup = centered_rect_sized(36, 3, area);
    frame.render_widget(Clear, popup);
    let text = Paragraph::new("press enter to start")
        .alignment(Alignment::Center)
        .block(Block::bordered());
    frame.render_widget(text, popup);
}

/// Render the whole page into `frame`.
pub fn draw(frame: &mut Frame, app: &App, now: Instant, settings: &Settings) {
    let area = frame.area();
    let cell = (
        settings.starfield.cell_width_px,
        settings.starfield.cell_height_px,
    );
    frame.render_widget(StarfieldLayer::new(&app.starfield, now, cell), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(PANEL_HEIGHT)])
        .split(area);

    if app.show_playlist {
        let side = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Percentage(40)])
            .split(chunks[0]);
        draw_playlist(frame, app, side[1]);
    }

    draw_player(frame, app, chunks[1], settings);

    if app.start_gate {
        draw_start_gate(frame, chunks[0]);
    }
}

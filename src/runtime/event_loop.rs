use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config::{self, StarfieldSettings};
use crate::starfield::Viewport;
use crate::ui;

/// Pixel size of the terminal window. Terminals that do not report pixels
/// get `cells * cell size`.
pub fn viewport_for(columns: u16, rows: u16, starfield: &StarfieldSettings) -> Viewport {
    if let Ok(size) = terminal::window_size() {
        if size.width > 0 && size.height > 0 && size.columns == columns && size.rows == rows {
            return Viewport::new(u32::from(size.width), u32::from(size.height));
        }
    }
    Viewport::new(
        u32::from(columns) * u32::from(starfield.cell_width_px),
        u32::from(rows) * u32::from(starfield.cell_height_px),
    )
}

/// Main terminal event loop: ticks the controller and the starfield, draws,
/// and dispatches keys. Returns `Ok(())` when quit is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = Duration::from_millis(settings.starfield.frame_ms);
    let mut rng = rand::thread_rng();

    loop {
        let now = Instant::now();
        app.tick(now, &mut rng);
        terminal.draw(|f| ui::draw(f, app, now, settings))?;

        if !event::poll(frame)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key(key, app, settings, Instant::now()) {
                    app.shutdown();
                    return Ok(());
                }
            }
            Event::Resize(columns, rows) => {
                app.resize(viewport_for(columns, rows, &settings.starfield), &mut rng);
            }
            _ => {}
        }
    }
}

/// Apply one key press. Returns `true` when the user asked to quit.
pub fn handle_key(key: KeyEvent, app: &mut App, settings: &config::Settings, now: Instant) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    let seek = settings.audio.seek_seconds as f64;
    let step = settings.audio.volume_step;

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Enter => app.play_selected(now),
        KeyCode::Char(' ') | KeyCode::Char('p') => app.toggle_play(now),
        KeyCode::Char('l') => app.play_next(now),
        KeyCode::Char('h') => app.play_prev(now),
        KeyCode::Char('L') => app.controller.seek_by(seek),
        KeyCode::Char('H') => app.controller.seek_by(-seek),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(step),
        KeyCode::Char('-') => app.change_volume(-step),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Tab => app.toggle_playlist(),
        _ => {}
    }
    false
}

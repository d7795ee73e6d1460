use std::env;
use std::path::PathBuf;
use std::time::Instant;

use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::starfield::{Starfield, StarfieldOptions};

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let log_path = logging::init();
    let settings = settings::load_settings();
    if let Some(path) = &log_path {
        tracing::info!(log = %path.display(), "nocturne starting");
    }

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let now = Instant::now();
    let controller = startup::build_controller(&settings, &dir, now)?;

    let (columns, rows) = terminal::size()?;
    let viewport = event_loop::viewport_for(columns, rows, &settings.starfield);
    let starfield = Starfield::new(
        viewport,
        StarfieldOptions::from(&settings.starfield),
        now,
        &mut rand::thread_rng(),
    );
    let mut app = App::new(
        controller,
        starfield,
        &settings.ui,
        Box::new(startup::reopen_output),
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown();
    run_result
}

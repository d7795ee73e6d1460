mod app;
mod audio;
mod cache;
mod config;
mod error;
mod playlist;
mod runtime;
mod session;
mod starfield;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::audio::fake::{FakeOutput, LoggingOrigin, SharedSession};
use crate::audio::{AudioOutput, ControllerOptions, NoOutput, PlaybackController};
use crate::cache::ReadThroughCache;
use crate::config::UiSettings;
use crate::error::PlayerError;
use crate::playlist::{Playlist, Track};
use crate::starfield::{Starfield, StarfieldOptions, Viewport};

fn t(id: &str) -> Track {
    Track {
        id: id.into(),
        title: id.to_uppercase(),
        artist: String::new(),
        src: format!("{id}.ogg"),
        duration: Some(Duration::from_secs(120)),
    }
}

fn unused_opener() -> OutputOpener {
    Box::new(|| panic!("output was available"))
}

/// An opener that counts its calls and hands out a fake device, or fails.
fn counting_opener(works: bool) -> (OutputOpener, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let opener: OutputOpener = Box::new(move || {
        seen.set(seen.get() + 1);
        if works {
            Ok(Box::new(FakeOutput::default()) as Box<dyn AudioOutput>)
        } else {
            Err(PlayerError::Output("still none".into()))
        }
    });
    (opener, calls)
}

fn app_with(ids: &[&str], output: Box<dyn AudioOutput>, autoplay: bool, now: Instant) -> App {
    app_opening(ids, output, autoplay, now, unused_opener())
}

fn app_opening(
    ids: &[&str],
    output: Box<dyn AudioOutput>,
    autoplay: bool,
    now: Instant,
    opener: OutputOpener,
) -> App {
    let playlist = Playlist::new(ids.iter().map(|id| t(id)).collect());
    let cache = ReadThroughCache::new(None, Arc::new(LoggingOrigin::default()));
    let options = ControllerOptions {
        autoplay,
        ..ControllerOptions::default()
    };
    let controller = PlaybackController::new(
        playlist,
        output,
        cache,
        Box::new(SharedSession::default()),
        options,
        now,
    );
    let starfield = Starfield::new(
        Viewport::new(600, 100),
        StarfieldOptions::default(),
        now,
        &mut StdRng::seed_from_u64(1),
    );
    App::new(controller, starfield, &UiSettings::default(), opener)
}

#[test]
fn autoplay_leaves_the_start_gate_down() {
    let now = Instant::now();
    let app = app_with(&["a", "b"], Box::new(FakeOutput::default()), true, now);
    assert!(!app.start_gate);
}

#[test]
fn disabled_autoplay_raises_a_one_time_start_gate() {
    let now = Instant::now();
    let mut app = app_with(&["a", "b"], Box::new(FakeOutput::default()), false, now);
    assert!(app.start_gate);
    assert!(!app.controller.state().playing);

    app.start(now);
    assert!(!app.start_gate);
    assert!(app.controller.state().playing);

    app.toggle_play(now);
    assert!(!app.start_gate);
    assert!(!app.controller.state().playing);
}

#[test]
fn start_reopens_a_missing_output() {
    let now = Instant::now();
    let (opener, calls) = counting_opener(true);
    let mut app = app_opening(&["a"], Box::new(NoOutput::new("none")), true, now, opener);
    assert!(app.start_gate);
    assert!(app.controller.needs_output());

    app.start(now);
    assert_eq!(calls.get(), 1);
    assert!(!app.start_gate);
    assert!(app.controller.is_loaded());
    assert!(app.controller.state().playing);
}

#[test]
fn space_at_the_gate_reopens_a_missing_output() {
    let now = Instant::now();
    let (opener, calls) = counting_opener(true);
    let mut app = app_opening(&["a", "b"], Box::new(NoOutput::new("none")), true, now, opener);
    assert!(app.start_gate);

    app.toggle_play(now);
    assert_eq!(calls.get(), 1);
    assert!(!app.start_gate);
    assert!(!app.controller.needs_output());
    assert!(app.controller.state().playing);
    assert_eq!(app.controller.state().index, 0);
}

#[test]
fn skipping_at_the_gate_counts_as_the_start() {
    let now = Instant::now();
    let (opener, calls) = counting_opener(true);
    let mut app = app_opening(&["a", "b"], Box::new(NoOutput::new("none")), true, now, opener);

    app.play_next(now);
    assert_eq!(calls.get(), 1);
    assert!(app.controller.state().playing);
    // The keypress opened the gate; it did not also skip.
    assert_eq!(app.controller.state().index, 0);

    app.play_next(now);
    assert_eq!(calls.get(), 1);
    assert_eq!(app.controller.state().index, 1);
}

#[test]
fn transport_keys_retry_a_device_that_is_still_missing() {
    let now = Instant::now();
    let (opener, calls) = counting_opener(false);
    let mut app = app_opening(&["a", "b"], Box::new(NoOutput::new("none")), true, now, opener);

    app.start(now);
    app.toggle_play(now);
    app.play_prev(now);
    assert_eq!(calls.get(), 3);
    assert!(!app.start_gate);
    assert!(!app.controller.state().playing);
}

#[test]
fn start_without_a_device_stays_silent() {
    let now = Instant::now();
    let (opener, calls) = counting_opener(false);
    let mut app = app_opening(&["a"], Box::new(NoOutput::new("none")), true, now, opener);
    app.start(now);
    assert_eq!(calls.get(), 1);
    assert!(!app.start_gate);
    assert!(!app.controller.state().playing);

    // The page keeps running.
    app.tick(now + Duration::from_secs(1), &mut StdRng::seed_from_u64(2));
    assert!(!app.controller.is_loaded());
}

#[test]
fn cursor_wraps_and_enter_plays_the_selection() {
    let now = Instant::now();
    let mut app = app_with(&["a", "b", "c"], Box::new(FakeOutput::default()), true, now);
    app.show_playlist = true;
    assert_eq!(app.selected, 0);

    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    app.next();
    assert_eq!(app.selected, 1);

    app.play_selected(now);
    assert_eq!(app.controller.state().index, 1);
    // The cursor stays put while the playlist is open.
    app.play_next(now);
    assert_eq!(app.controller.state().index, 2);
    assert_eq!(app.selected, 1);
}

#[test]
fn volume_changes_are_clamped() {
    let now = Instant::now();
    let mut app = app_with(&["a"], Box::new(FakeOutput::default()), true, now);
    for _ in 0..30 {
        app.change_volume(0.05);
    }
    assert_eq!(app.controller.state().volume, 1.0);
    for _ in 0..30 {
        app.change_volume(-0.05);
    }
    assert_eq!(app.controller.state().volume, 0.0);
}

#[test]
fn resize_forwards_new_viewports_to_the_starfield() {
    let now = Instant::now();
    let mut app = app_with(&["a"], Box::new(FakeOutput::default()), true, now);
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(app.starfield.stars().len(), 100);

    app.resize(Viewport::new(1200, 100), &mut rng);
    assert_eq!(app.starfield.stars().len(), 200);
    assert_eq!(app.starfield.viewport(), Viewport::new(1200, 100));
}

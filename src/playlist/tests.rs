use super::model::resolve_src;
use super::*;
use crate::config::{PlaylistSettings, TrackSetting};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn setting(title: &str, src: &str) -> TrackSetting {
    TrackSetting {
        id: None,
        title: title.into(),
        artist: String::new(),
        src: src.into(),
        duration_secs: None,
    }
}

#[test]
fn next_and_prev_wrap_around() {
    let settings = PlaylistSettings {
        tracks: vec![setting("a", "a.mp3"), setting("b", "b.mp3"), setting("c", "c.mp3")],
        ..PlaylistSettings::default()
    };
    let p = Playlist::from_settings(&settings);
    assert_eq!(p.next_index(0), 1);
    assert_eq!(p.next_index(2), 0);
    assert_eq!(p.prev_index(0), 2);
    assert_eq!(p.prev_index(1), 0);

    let mut i = 1;
    for _ in 0..p.len() {
        i = p.next_index(i);
    }
    assert_eq!(i, 1);
}

#[test]
fn empty_playlist_indices_stay_at_zero() {
    let p = Playlist::default();
    assert!(p.is_empty());
    assert_eq!(p.next_index(0), 0);
    assert_eq!(p.prev_index(0), 0);
}

#[test]
fn from_settings_assigns_ids_and_resolves_sources() {
    let mut night = setting("Night Owl", "https://example.com/owl.mp3");
    night.id = Some("owl".into());
    night.duration_secs = Some(200.0);
    let settings = PlaylistSettings {
        base_path: Some(PathBuf::from("/srv/music")),
        tracks: vec![setting("Reflections", "music/reflections.wav"), night],
        ..PlaylistSettings::default()
    };
    let p = Playlist::from_settings(&settings);

    let first = p.get(0).unwrap();
    assert_eq!(first.id, "1");
    assert_eq!(first.src, "/srv/music/music/reflections.wav");
    assert_eq!(first.duration, None);

    let second = p.get(1).unwrap();
    assert_eq!(second.id, "owl");
    assert_eq!(second.src, "https://example.com/owl.mp3");
    assert_eq!(second.duration, Some(Duration::from_secs(200)));
}

#[test]
fn resolve_src_leaves_urls_and_absolute_paths_alone() {
    let base = Path::new("/base");
    assert_eq!(resolve_src("http://x/y.mp3", Some(base)), "http://x/y.mp3");
    assert_eq!(resolve_src("/abs/y.mp3", Some(base)), "/abs/y.mp3");
    assert_eq!(resolve_src("./rel/y.mp3", Some(base)), "/base/rel/y.mp3");
    assert_eq!(resolve_src("rel/y.mp3", None), "rel/y.mp3");
}

#[test]
fn display_prefers_artist_dash_title() {
    let mut t = Track {
        id: "1".into(),
        title: "Song".into(),
        artist: "  Artist ".into(),
        src: "s.mp3".into(),
        duration: None,
    };
    assert_eq!(t.display(), "Artist - Song");
    t.artist = "   ".into();
    assert_eq!(t.display(), "Song");
}

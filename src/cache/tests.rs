use super::*;
use crate::error::PlayerError;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Default)]
struct CountingOrigin {
    fetches: AtomicUsize,
    missing: Mutex<Vec<String>>,
    remote: bool,
}

impl Origin for CountingOrigin {
    fn fetch(&self, src: &str) -> crate::error::Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.missing.lock().unwrap().iter().any(|m| m == src) {
            return Err(PlayerError::Fetch {
                src: src.to_string(),
                reason: "404".into(),
            });
        }
        Ok(format!("bytes:{src}").into_bytes())
    }

    fn is_remote(&self, _src: &str) -> bool {
        self.remote
    }
}

struct BrokenStore;

impl AudioStore for BrokenStore {
    fn get(&mut self, _key: &str) -> Option<AudioBytes> {
        None
    }

    fn put(&mut self, key: &str, _bytes: AudioBytes) -> crate::error::Result<()> {
        Err(PlayerError::io(
            key,
            std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"),
        ))
    }
}

fn stored_count(done: Vec<Prefetched>) -> usize {
    done.iter().filter(|p| p.result.is_ok()).count()
}

fn wait_for_prefetch(cache: &mut ReadThroughCache) -> usize {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut stored = 0;
    while cache.prefetches_in_flight() > 0 && Instant::now() < deadline {
        stored += stored_count(cache.poll_prefetches());
        std::thread::sleep(Duration::from_millis(5));
    }
    stored + stored_count(cache.poll_prefetches())
}

#[test]
fn memory_hit_short_circuits_origin() {
    let origin = Arc::new(CountingOrigin::default());
    let mut cache = ReadThroughCache::new(None, origin.clone());

    let (first, hit) = cache.load("a.mp3").unwrap();
    assert_eq!(hit, CacheHit::Origin);
    assert_eq!(&first[..], b"bytes:a.mp3");

    let (second, hit) = cache.load("a.mp3").unwrap();
    assert_eq!(hit, CacheHit::Memory);
    assert_eq!(first, second);
    assert_eq!(origin.fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn durable_tier_survives_a_new_cache_instance() {
    let dir = tempfile::tempdir().unwrap();
    let origin = Arc::new(CountingOrigin::default());

    {
        let disk = DiskStore::open(dir.path().join("audio")).unwrap();
        let mut cache = ReadThroughCache::new(Some(Box::new(disk)), origin.clone());
        cache.load("song.wav").unwrap();
    }

    let disk = DiskStore::open(dir.path().join("audio")).unwrap();
    let mut cache = ReadThroughCache::new(Some(Box::new(disk)), origin.clone());
    let (bytes, hit) = cache.load("song.wav").unwrap();
    assert_eq!(hit, CacheHit::Durable);
    assert_eq!(&bytes[..], b"bytes:song.wav");
    assert!(cache.memory().contains("song.wav"));
    assert_eq!(origin.fetches.load(Ordering::SeqCst), 1);

    let (_, hit) = cache.load("song.wav").unwrap();
    assert_eq!(hit, CacheHit::Memory);
}

#[test]
fn failing_durable_tier_degrades_to_memory_only() {
    let origin = Arc::new(CountingOrigin::default());
    let mut cache = ReadThroughCache::new(Some(Box::new(BrokenStore)), origin.clone());
    assert!(cache.has_durable_tier());

    let (bytes, hit) = cache.load("x.mp3").unwrap();
    assert_eq!(hit, CacheHit::Origin);
    assert_eq!(&bytes[..], b"bytes:x.mp3");
    assert!(!cache.has_durable_tier());

    let (_, hit) = cache.load("x.mp3").unwrap();
    assert_eq!(hit, CacheHit::Memory);
}

#[test]
fn origin_failure_is_the_only_error() {
    let origin = Arc::new(CountingOrigin::default());
    origin.missing.lock().unwrap().push("gone.mp3".into());
    let mut cache = ReadThroughCache::new(None, origin.clone());

    let err = cache.load("gone.mp3").unwrap_err();
    assert!(matches!(err, PlayerError::Fetch { .. }));
    assert!(!cache.memory().contains("gone.mp3"));
}

#[test]
fn prefetch_populates_memory_without_blocking_load() {
    let origin = Arc::new(CountingOrigin::default());
    let mut cache = ReadThroughCache::new(None, origin.clone());

    cache.prefetch("next.mp3");
    // Duplicate requests while in flight are coalesced.
    cache.prefetch("next.mp3");
    assert_eq!(wait_for_prefetch(&mut cache), 1);
    assert!(cache.memory().contains("next.mp3"));

    let (_, hit) = cache.load("next.mp3").unwrap();
    assert_eq!(hit, CacheHit::Memory);
    assert_eq!(origin.fetches.load(Ordering::SeqCst), 1);

    // Already cached: nothing to do.
    cache.prefetch("next.mp3");
    assert_eq!(cache.prefetches_in_flight(), 0);
}

#[test]
fn failed_prefetch_leaves_cache_untouched() {
    let origin = Arc::new(CountingOrigin::default());
    origin.missing.lock().unwrap().push("nope.mp3".into());
    let mut cache = ReadThroughCache::new(None, origin);

    cache.prefetch("nope.mp3");
    assert_eq!(wait_for_prefetch(&mut cache), 0);
    assert!(cache.memory().is_empty());
}

#[test]
fn disk_store_names_blobs_by_hash_and_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut disk = DiskStore::open(dir.path()).unwrap();
    let key = "https://example.com/music/night owl.mp3";

    assert!(disk.get(key).is_none());
    disk.put(key, Arc::from(&b"abc"[..])).unwrap();
    assert_eq!(&disk.get(key).unwrap()[..], b"abc");

    let names: Vec<String> = std::fs::read_dir(disk.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".bin"));
    assert!(!names[0].contains(' '));
}

#[test]
fn source_origin_reads_local_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local.wav");
    std::fs::write(&path, b"RIFF").unwrap();

    let origin = SourceOrigin::new().unwrap();
    assert_eq!(origin.fetch(path.to_str().unwrap()).unwrap(), b"RIFF");
    assert!(matches!(
        origin.fetch(dir.path().join("missing.wav").to_str().unwrap()),
        Err(PlayerError::Io { .. })
    ));
}

#[test]
fn try_load_reads_local_misses_inline() {
    let origin = Arc::new(CountingOrigin::default());
    let mut cache = ReadThroughCache::new(None, origin.clone());

    let (bytes, hit) = cache.try_load("local.flac").unwrap().unwrap();
    assert_eq!(hit, CacheHit::Origin);
    assert_eq!(&bytes[..], b"bytes:local.flac");
    assert_eq!(cache.prefetches_in_flight(), 0);
}

#[test]
fn try_load_hands_remote_misses_to_the_background() {
    let origin = Arc::new(CountingOrigin {
        remote: true,
        ..CountingOrigin::default()
    });
    let mut cache = ReadThroughCache::new(None, origin.clone());

    assert!(cache.try_load("https://x/a.mp3").unwrap().is_none());
    // Asking again while in flight does not start a second fetch.
    assert!(cache.try_load("https://x/a.mp3").unwrap().is_none());
    assert_eq!(wait_for_prefetch(&mut cache), 1);
    assert_eq!(origin.fetches.load(Ordering::SeqCst), 1);

    let (_, hit) = cache.try_load("https://x/a.mp3").unwrap().unwrap();
    assert_eq!(hit, CacheHit::Memory);
}

#[test]
fn poll_reports_failed_fetches_by_key() {
    let origin = Arc::new(CountingOrigin {
        remote: true,
        ..CountingOrigin::default()
    });
    origin.missing.lock().unwrap().push("https://x/404.mp3".into());
    let mut cache = ReadThroughCache::new(None, origin);

    assert!(cache.try_load("https://x/404.mp3").unwrap().is_none());
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut done = Vec::new();
    while done.is_empty() && Instant::now() < deadline {
        done = cache.poll_prefetches();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].key, "https://x/404.mp3");
    assert!(matches!(done[0].result, Err(PlayerError::Fetch { .. })));
}

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use metacat::core::thumbnail::{PlaceholderDecoder, ThumbnailDecoder, Thumbnailer};
use metacat::models::ThumbnailData;

struct FailingDecoder;

impl ThumbnailDecoder for FailingDecoder {
    fn decode(&self, _path: &Path, _size: u32) -> Option<ThumbnailData> {
        None
    }
}

#[test]
fn placeholder_decoder_is_deterministic_per_path() {
    let decoder = PlaceholderDecoder;
    let first = decoder.decode(Path::new("a.jpg"), 32).expect("thumbnail");
    let second = decoder.decode(Path::new("a.jpg"), 32).expect("thumbnail");
    assert_eq!(first, second);
    assert_eq!(first.width, 32);
    assert_eq!(first.height, 32);
    assert_eq!(first.pixels.len(), 32 * 32 * 4);

    let other = decoder.decode(Path::new("b.jpg"), 32).expect("thumbnail");
    assert_ne!(first.pixels, other.pixels);
}

#[test]
fn results_are_served_from_the_disk_cache_on_repeat_requests() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cache_dir = dir.path().to_path_buf();

    let thumbnailer = Thumbnailer::with_placeholder(cache_dir.clone(), 16);
    let produced = thumbnailer
        .request(Path::new("photo.jpg"), 64, None)
        .expect("thumbnail produced");
    assert_eq!(fs::read_dir(&cache_dir).expect("cache dir").count(), 1);

    // A decoder that cannot decode proves the second request hits the cache.
    let cached_only = Thumbnailer::new(cache_dir, 16, Box::new(FailingDecoder));
    let cached = cached_only
        .request(Path::new("photo.jpg"), 64, None)
        .expect("cache hit");
    assert_eq!(cached, produced);

    assert!(cached_only.request(Path::new("other.jpg"), 64, None).is_none());
}

#[test]
fn cache_keys_include_the_target_size() {
    let dir = tempfile::tempdir().expect("temp dir");
    let thumbnailer = Thumbnailer::with_placeholder(dir.path().to_path_buf(), 16);

    let small = thumbnailer
        .request(Path::new("photo.jpg"), 32, None)
        .expect("small thumbnail");
    let large = thumbnailer
        .request(Path::new("photo.jpg"), 64, None)
        .expect("large thumbnail");
    assert_eq!(small.width, 32);
    assert_eq!(large.width, 64);
    assert_eq!(fs::read_dir(dir.path()).expect("cache dir").count(), 2);
}

#[test]
fn a_set_cancellation_flag_suppresses_the_result() {
    let dir = tempfile::tempdir().expect("temp dir");
    let thumbnailer = Thumbnailer::with_placeholder(dir.path().to_path_buf(), 16);

    let cancelled = AtomicBool::new(true);
    assert!(thumbnailer
        .request(Path::new("photo.jpg"), 64, Some(&cancelled))
        .is_none());

    let live = AtomicBool::new(false);
    assert!(thumbnailer
        .request(Path::new("photo.jpg"), 64, Some(&live))
        .is_some());
}

#[test]
fn cache_evicts_down_to_the_size_limit() {
    let dir = tempfile::tempdir().expect("temp dir");
    let thumbnailer = Thumbnailer::with_placeholder(dir.path().to_path_buf(), 2);

    for name in ["a.jpg", "b.jpg", "c.jpg", "d.jpg"] {
        thumbnailer
            .request(Path::new(name), 32, None)
            .expect("thumbnail");
    }

    assert!(fs::read_dir(dir.path()).expect("cache dir").count() <= 2);
}

#[test]
fn concurrent_requests_for_one_key_agree_on_the_result() {
    let dir = tempfile::tempdir().expect("temp dir");
    let thumbnailer = Arc::new(Thumbnailer::with_placeholder(dir.path().to_path_buf(), 16));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = thumbnailer.clone();
            thread::spawn(move || shared.request(Path::new("same.jpg"), 48, None))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread").expect("thumbnail"))
        .collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

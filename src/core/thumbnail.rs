//! Thumbnail generation with a disk cache and in-flight request
//! deduplication. The pixel decode itself sits behind a trait so real
//! codecs plug in from outside the core.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::SystemTime;

use log::debug;

use crate::models::ThumbnailData;

/// Pixel decoding seam. Implementations produce RGBA8 thumbnails at a
/// target square size, or `None` when the image cannot be decoded.
pub trait ThumbnailDecoder: Send + Sync {
    fn decode(&self, path: &Path, size: u32) -> Option<ThumbnailData>;
}

/// Procedural stand-in decoder: a deterministic gradient seeded from the
/// path, so layouts and caches can be exercised without a codec.
pub struct PlaceholderDecoder;

impl ThumbnailDecoder for PlaceholderDecoder {
    fn decode(&self, path: &Path, size: u32) -> Option<ThumbnailData> {
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        let seed = hasher.finish();

        let mut pixels = vec![0; (size * size * 4) as usize];
        for y in 0..size {
            for x in 0..size {
                let index = ((y * size + x) * 4) as usize;
                let base = ((seed + (x as u64 * 31) + (y as u64 * 17)) % 255) as u8;

                pixels[index] = base;
                pixels[index + 1] = base.saturating_add((x * 2) as u8);
                pixels[index + 2] = base.saturating_add((y * 2) as u8);
                pixels[index + 3] = 255;
            }
        }

        Some(ThumbnailData {
            width: size,
            height: size,
            pixels,
        })
    }
}

/// Slot a second requester of an in-flight key waits on. Publishing fills
/// the slot exactly once, success or not.
#[derive(Default)]
struct Inflight {
    slot: Mutex<Option<Option<ThumbnailData>>>,
    done: Condvar,
}

impl Inflight {
    fn publish(&self, result: Option<ThumbnailData>) {
        *lock(&self.slot) = Some(result);
        self.done.notify_all();
    }

    fn wait(&self) -> Option<ThumbnailData> {
        let mut slot = lock(&self.slot);
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = self
                .done
                .wait(slot)
                .unwrap_or_else(|poison| poison.into_inner());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

enum Claim {
    Owner(Arc<Inflight>),
    Joiner(Arc<Inflight>),
}

pub struct Thumbnailer {
    cache_dir: PathBuf,
    max_size: usize,
    decoder: Box<dyn ThumbnailDecoder>,
    inflight: Mutex<HashMap<String, Arc<Inflight>>>,
}

impl Thumbnailer {
    pub fn new(cache_dir: PathBuf, max_size: usize, decoder: Box<dyn ThumbnailDecoder>) -> Self {
        Self {
            cache_dir,
            max_size: max_size.max(1),
            decoder,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_placeholder(cache_dir: PathBuf, max_size: usize) -> Self {
        Self::new(cache_dir, max_size, Box::new(PlaceholderDecoder))
    }

    /// Thumbnail for `path` at the target square `size`. A second request
    /// for the same key while one is in flight awaits the first result
    /// instead of decoding twice. A set cancellation flag suppresses the
    /// result for this caller only, checked before publishing outward.
    pub fn request(
        &self,
        path: &Path,
        size: u32,
        cancel: Option<&AtomicBool>,
    ) -> Option<ThumbnailData> {
        let key = request_key(path, size);

        let claim = {
            let mut table = lock(&self.inflight);
            match table.get(&key) {
                Some(existing) => Claim::Joiner(existing.clone()),
                None => {
                    let fresh = Arc::new(Inflight::default());
                    table.insert(key.clone(), fresh.clone());
                    Claim::Owner(fresh)
                }
            }
        };

        let result = match claim {
            Claim::Joiner(inflight) => inflight.wait(),
            Claim::Owner(inflight) => {
                let produced = self.produce(path, size, &key);
                // The dedup entry clears on completion, success or not.
                lock(&self.inflight).remove(&key);
                inflight.publish(produced.clone());
                produced
            }
        };

        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return None;
            }
        }
        result
    }

    fn produce(&self, path: &Path, size: u32, key: &str) -> Option<ThumbnailData> {
        if fs::create_dir_all(&self.cache_dir).is_err() {
            return self.decoder.decode(path, size);
        }

        let cache_path = self.cache_path(key);
        if cache_path.exists() {
            if let Some(cached) = load_cached(&cache_path) {
                return Some(cached);
            }
        }

        let thumbnail = self.decoder.decode(path, size)?;
        if let Err(err) = save_cached(&cache_path, &thumbnail) {
            debug!("thumbnail cache write failed for {}: {err}", path.display());
        }
        self.enforce_cache_size();
        Some(thumbnail)
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.cache_dir.join(format!("{:016x}.thumb", hasher.finish()))
    }

    fn enforce_cache_size(&self) {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            return;
        };

        let mut indexed_entries: Vec<(PathBuf, SystemTime)> = entries
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let path = entry.path();
                let modified = entry
                    .metadata()
                    .ok()
                    .and_then(|metadata| metadata.modified().ok())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                Some((path, modified))
            })
            .collect();

        if indexed_entries.len() <= self.max_size {
            return;
        }

        indexed_entries.sort_by_key(|(_, modified)| *modified);

        let remove_count = indexed_entries.len().saturating_sub(self.max_size);
        for (path, _) in indexed_entries.into_iter().take(remove_count) {
            let _ = fs::remove_file(path);
        }
    }
}

pub fn request_key(path: &Path, size: u32) -> String {
    format!("{}@{size}", path.display())
}

fn load_cached(path: &Path) -> Option<ThumbnailData> {
    let mut bytes = Vec::new();
    let mut file = fs::File::open(path).ok()?;
    file.read_to_end(&mut bytes).ok()?;

    if bytes.len() < 8 {
        return None;
    }

    let width = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let height = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let pixels = bytes[8..].to_vec();

    Some(ThumbnailData {
        width,
        height,
        pixels,
    })
}

fn save_cached(path: &Path, thumbnail: &ThumbnailData) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(&thumbnail.width.to_le_bytes())?;
    file.write_all(&thumbnail.height.to_le_bytes())?;
    file.write_all(&thumbnail.pixels)?;
    file.flush()?;
    Ok(())
}

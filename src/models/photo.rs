use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::TagDictionary;

/// One on-disk image plus its lazily-loaded metadata snapshot. Identity,
/// equality, and hashing are by `id` (derived from the file path) so that
/// set-based selection stays stable across reloads and re-sorts.
#[derive(Clone, Debug)]
pub struct PhotoRecord {
    pub id: String,
    pub path: PathBuf,
    pub metadata: Option<TagDictionary>,
}

impl PhotoRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: record_id_for(&path),
            path,
            metadata: None,
        }
    }

    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("unknown"))
    }

    pub fn set_metadata(&mut self, metadata: TagDictionary) {
        self.metadata = Some(metadata);
    }
}

impl PartialEq for PhotoRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PhotoRecord {}

impl Hash for PhotoRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub fn record_id_for(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Signed decimal-degree coordinate. The GPS tag group stores absolute
/// values plus N/S and E/W reference letters; conversion lives with the
/// key tables in `core::keys`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Tri-state location edit for a session: untouched, set to a coordinate,
/// or explicitly removed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LocationEdit {
    #[default]
    Unchanged,
    Set(Coordinate),
    Removed,
}

impl LocationEdit {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Set(coordinate) => Some(*coordinate),
            _ => None,
        }
    }
}

/// Decoded thumbnail pixels (RGBA8) at a target size.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThumbnailData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

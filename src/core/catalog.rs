//! The managed photo directory: enumeration, sort strategies, id-keyed
//! selection, ingestion, and deletion.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use log::warn;

use crate::models::{CatalogConfig, PhotoRecord, SortOrder, TagDictionary, TagValue, GROUP_EXIF};

use super::format::parse_exif_datetime;
use super::io::TagStore;
use super::keys::exif;

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    BatchTooLarge { selected: usize, max: usize },
    EmptySelection,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::BatchTooLarge { selected, max } => {
                write!(f, "{selected} photos selected, batch edits cap at {max}")
            }
            Self::EmptySelection => write!(f, "no photos selected"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Aggregate result of deleting the current selection. Photos that fail to
/// unlink keep their records and selection ids so the delete can be
/// retried.
#[derive(Clone, Debug, Default)]
pub struct DeleteOutcome {
    pub removed: usize,
    pub failed: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl DeleteOutcome {
    pub fn all_removed(&self) -> bool {
        self.failed == 0
    }
}

pub struct Catalog {
    directory: PathBuf,
    config: CatalogConfig,
    records: Vec<PhotoRecord>,
    selection: HashSet<String>,
}

impl Catalog {
    pub fn open(directory: impl Into<PathBuf>, config: CatalogConfig) -> Result<Self> {
        let mut catalog = Self {
            directory: directory.into(),
            config,
            records: Vec::new(),
            selection: HashSet::new(),
        };
        catalog.reload()?;
        Ok(catalog)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn config(&self) -> CatalogConfig {
        self.config
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Re-enumerate the managed directory. Metadata snapshots of surviving
    /// records are kept; selection ids pointing at removed files are
    /// dropped.
    pub fn reload(&mut self) -> Result<()> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if !path.is_file() || !is_catalog_image(&path) {
                continue;
            }
            records.push(PhotoRecord::new(path));
        }
        records.sort_by(|a, b| a.path.cmp(&b.path));

        for record in &mut records {
            if let Some(existing) = self.records.iter().find(|r| r.id == record.id) {
                record.metadata = existing.metadata.clone();
            }
        }
        self.records = records;
        self.sort();

        let live_ids: HashSet<&String> = self.records.iter().map(|record| &record.id).collect();
        self.selection.retain(|id| live_ids.contains(id));
        Ok(())
    }

    /// Metadata snapshot for one record, loading it on first access.
    pub fn ensure_metadata(&mut self, id: &str) -> Option<&TagDictionary> {
        let record = self.records.iter_mut().find(|record| record.id == id)?;
        if record.metadata.is_none() {
            record.set_metadata(TagStore::new(&record.path).load());
        }
        record.metadata.as_ref()
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.config.sort_order = order;
        self.sort();
    }

    fn sort(&mut self) {
        match self.config.sort_order {
            SortOrder::RecentlyAdded => {
                self.records
                    .sort_by_key(|record| Reverse(ingestion_timestamp(&record.path)));
            }
            SortOrder::DateCaptured => {
                self.load_all_metadata();
                self.records
                    .sort_by_key(|record| Reverse(record_date(record, exif::DATE_TIME_ORIGINAL)));
            }
            SortOrder::DateModified => {
                self.load_all_metadata();
                self.records
                    .sort_by_key(|record| Reverse(record_date(record, exif::DATE_TIME_DIGITIZED)));
            }
        }
    }

    fn load_all_metadata(&mut self) {
        for record in &mut self.records {
            if record.metadata.is_none() {
                record.set_metadata(TagStore::new(&record.path).load());
            }
        }
    }

    /// Ingest raw image bytes under the catalog's filename convention and
    /// re-sort under the active strategy.
    pub fn add_image(&mut self, bytes: &[u8], index: usize) -> Result<PathBuf> {
        let millis = Utc::now().timestamp_millis();
        let path = self
            .directory
            .join(format!("IMG_Metacat_{index:02}_{millis}.jpg"));
        fs::write(&path, bytes)?;

        let mut record = PhotoRecord::new(&path);
        record.set_metadata(TagStore::new(&path).load());
        self.records.push(record);
        self.sort();
        Ok(path)
    }

    /// Delete every selected photo (file, sidecar, record, selection id).
    /// Best-effort: one photo's failure never blocks the others, and a
    /// failed photo stays in the catalog and the selection. A file that is
    /// already gone counts as removed.
    pub fn delete_selected(&mut self) -> DeleteOutcome {
        let doomed: Vec<String> = self
            .records
            .iter()
            .filter(|record| self.selection.contains(&record.id))
            .map(|record| record.id.clone())
            .collect();

        let mut outcome = DeleteOutcome::default();
        for id in doomed {
            let Some(position) = self.records.iter().position(|record| record.id == id) else {
                continue;
            };
            let path = self.records[position].path.clone();
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!("delete failed for {}: {err}", path.display());
                    outcome.failed += 1;
                    outcome.errors.push((path, err.to_string()));
                    continue;
                }
            }
            if let Err(err) = fs::remove_file(TagStore::sidecar_path(&path)) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("sidecar cleanup failed for {}: {err}", path.display());
                }
            }
            self.records.remove(position);
            self.selection.remove(&id);
            outcome.removed += 1;
        }
        outcome
    }

    // Selection is keyed by record id so it survives re-sorts and reloads.

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if self.records.iter().all(|record| record.id != id) {
            return false;
        }
        if !self.selection.remove(id) {
            self.selection.insert(id.to_string());
        }
        true
    }

    pub fn select_all(&mut self) {
        self.selection = self.records.iter().map(|record| record.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Selected paths in current display order.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.records
            .iter()
            .filter(|record| self.selection.contains(&record.id))
            .map(|record| record.path.clone())
            .collect()
    }

    /// Batch edits require a non-empty selection within the configured cap.
    pub fn can_edit_batch(&self) -> bool {
        (1..=self.config.max_batch_size).contains(&self.selection.len())
    }

    /// Like `can_edit_batch` but with a diagnosable error for callers that
    /// surface the reason.
    pub fn validate_batch(&self) -> Result<Vec<PathBuf>> {
        if self.selection.is_empty() {
            return Err(CatalogError::EmptySelection);
        }
        if self.selection.len() > self.config.max_batch_size {
            return Err(CatalogError::BatchTooLarge {
                selected: self.selection.len(),
                max: self.config.max_batch_size,
            });
        }
        Ok(self.selected_paths())
    }
}

fn is_catalog_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    matches!(ext.as_str(), "jpg" | "jpeg")
}

/// Ingestion timestamp embedded as the 4th underscore-delimited filename
/// component. Non-conforming names sort as 0 (oldest).
pub fn ingestion_timestamp(path: &Path) -> i64 {
    let stem = path
        .file_stem()
        .map(|value| value.to_string_lossy().to_string())
        .unwrap_or_default();

    stem.split('_')
        .nth(3)
        .and_then(|part| part.parse::<i64>().ok())
        .unwrap_or(0)
}

fn record_date(record: &PhotoRecord, key: &str) -> NaiveDateTime {
    record
        .metadata
        .as_ref()
        .and_then(|dict| dict.group_value(GROUP_EXIF, key))
        .and_then(TagValue::as_str)
        .and_then(parse_exif_datetime)
        .unwrap_or(NaiveDateTime::MIN)
}

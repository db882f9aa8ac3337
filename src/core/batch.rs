//! Batch edit engine: one dirty-gated payload applied identically to every
//! photo in the session, fanned out in parallel with progress events and
//! best-effort error collection.

use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc::Sender,
};

use chrono::{NaiveDateTime, Utc};
use log::debug;
use rayon::prelude::*;

use crate::models::{FieldSet, LocationEdit, TagDictionary, GROUP_GPS};

use super::edit::{FieldEditState, WritePolicy};
use super::io::TagStore;
use super::keys::{gps_group, EDITABLE_EXIF_MAP, EDITABLE_IPTC_MAP};

/// Progress event emitted once per photo as the fan-out proceeds.
#[derive(Clone, Debug)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
    pub filename: String,
    pub success: bool,
}

/// Aggregate result of one batch apply. Per-photo failures are collected,
/// never aborted on.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    pub total: usize,
    pub saved: usize,
    pub failed: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchOutcome {
    pub fn all_saved(&self) -> bool {
        self.failed == 0
    }
}

/// One edit transaction over a bounded set of photos. Fields start blank,
/// so "blank and unmodified" unambiguously means "do not touch".
pub struct BatchSession {
    paths: Vec<PathBuf>,
    state: FieldEditState,
    location: LocationEdit,
}

impl BatchSession {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let mut iptc = FieldSet::project(None, EDITABLE_IPTC_MAP);
        iptc.clear_values();
        let mut exif = FieldSet::project(None, EDITABLE_EXIF_MAP);
        exif.clear_values();

        Self {
            paths,
            state: FieldEditState::new(iptc, exif, Utc::now().naive_utc()),
            location: LocationEdit::Unchanged,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn state(&self) -> &FieldEditState {
        &self.state
    }

    pub fn location(&self) -> LocationEdit {
        self.location
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> bool {
        self.state.set_field(key, value)
    }

    pub fn set_date_taken(&mut self, date: NaiveDateTime) {
        self.state.set_date_taken(date);
    }

    pub fn set_location(&mut self, location: LocationEdit) {
        self.location = location;
    }

    pub fn has_changes(&self) -> bool {
        self.state.any_modified() || self.location != LocationEdit::Unchanged
    }

    /// The shared update dictionary, or `None` when nothing was touched
    /// (a true no-op: zero writes to any photo).
    pub fn build_update(&self) -> Option<TagDictionary> {
        if !self.has_changes() {
            return None;
        }

        let mut updates = self
            .state
            .build_update(WritePolicy::DirtyGated, Utc::now().naive_utc());
        match self.location {
            LocationEdit::Unchanged => {}
            LocationEdit::Set(coordinate) => {
                updates.set_group(GROUP_GPS, gps_group(coordinate));
            }
            LocationEdit::Removed => {
                updates.set_group(GROUP_GPS, Default::default());
            }
        }
        Some(updates)
    }

    /// Apply the session to every photo: same payload, independent
    /// per-photo persistence calls. One photo's failure never blocks the
    /// others; cancellation skips photos not yet started.
    pub fn save_changes(
        &self,
        progress_tx: Sender<BatchProgress>,
        cancel_flag: Option<&AtomicBool>,
    ) -> BatchOutcome {
        let Some(updates) = self.build_update() else {
            debug!("batch session had no changes, skipping all writes");
            return BatchOutcome {
                total: self.paths.len(),
                ..BatchOutcome::default()
            };
        };

        let total = self.paths.len();
        let progress_counter = AtomicUsize::new(0);

        let results: Vec<(PathBuf, Option<String>)> = self
            .paths
            .par_iter()
            .filter_map(|path| {
                if let Some(flag) = cancel_flag {
                    if flag.load(Ordering::Relaxed) {
                        return None;
                    }
                }

                let error = TagStore::new(path)
                    .save(&updates)
                    .err()
                    .map(|err| err.to_string());

                let current = progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
                let _ = progress_tx.send(BatchProgress {
                    current,
                    total,
                    filename: display_name(path),
                    success: error.is_none(),
                });

                Some((path.clone(), error))
            })
            .collect();

        let mut outcome = BatchOutcome {
            total,
            ..BatchOutcome::default()
        };
        for (path, error) in results {
            match error {
                None => outcome.saved += 1,
                Some(message) => {
                    outcome.failed += 1;
                    outcome.errors.push((path, message));
                }
            }
        }
        outcome
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("unknown"))
}

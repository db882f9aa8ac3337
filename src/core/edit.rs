//! Field-edit sessions. `FieldEditState` carries the editable projections
//! and builds update dictionaries; the single-image and batch engines
//! differ only by the `WritePolicy` they hand it, not by subclassed
//! behavior.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDateTime, Utc};

use crate::models::{
    Coordinate, EditableField, FieldSet, MetadataFilter, TagDictionary, TagValue, GROUP_EXIF,
    GROUP_GPS, GROUP_IPTC, GROUP_TIFF,
};

use super::format::{
    iptc_date_string, iptc_time_string, parse_exif_datetime, parse_iptc_datetime, split_comma_list,
};
use super::io::{Result, TagStore};
use super::keys::{
    exif, gps_group, iptc, parse_gps_group, EDITABLE_EXIF_MAP, EDITABLE_IPTC_MAP, ESSENTIALS_KEYS,
    TIFF_ROUTED_KEYS,
};

/// How a session's fields translate into a saved dictionary. The
/// single-image engine writes every field's current value; batch sessions
/// only write fields the user actually touched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WritePolicy {
    Unconditional,
    DirtyGated,
}

impl WritePolicy {
    fn includes(self, field: &EditableField) -> bool {
        match self {
            Self::Unconditional => true,
            Self::DirtyGated => field.is_modified() && !field.value().is_empty(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionPhase {
    Loaded,
    Editing,
    Saved,
    Cancelled,
}

/// The shared editable state of a session: IPTC and EXIF/TIFF field sets
/// plus the dirty-tracked date-taken.
#[derive(Clone, Debug)]
pub struct FieldEditState {
    pub iptc: FieldSet,
    pub exif: FieldSet,
    date_taken: NaiveDateTime,
    date_modified: bool,
}

impl FieldEditState {
    pub fn new(iptc: FieldSet, exif: FieldSet, date_taken: NaiveDateTime) -> Self {
        Self {
            iptc,
            exif,
            date_taken,
            date_modified: false,
        }
    }

    pub fn date_taken(&self) -> NaiveDateTime {
        self.date_taken
    }

    pub fn date_modified(&self) -> bool {
        self.date_modified
    }

    pub fn set_date_taken(&mut self, date: NaiveDateTime) {
        self.date_taken = date;
        self.date_modified = true;
    }

    pub fn any_modified(&self) -> bool {
        self.date_modified || self.iptc.any_modified() || self.exif.any_modified()
    }

    /// Write through to whichever field set carries `key`.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.iptc.set_value(key, value.clone()) || self.exif.set_value(key, value)
    }

    /// Build the update dictionary for this state. `saved_at` stamps the
    /// IPTC digital-creation provenance pair on unconditional saves.
    pub fn build_update(&self, policy: WritePolicy, saved_at: NaiveDateTime) -> TagDictionary {
        let mut updates = TagDictionary::new();

        let mut iptc_map: BTreeMap<String, TagValue> = BTreeMap::new();

        let write_date = match policy {
            WritePolicy::Unconditional => true,
            WritePolicy::DirtyGated => self.date_modified,
        };
        if write_date {
            iptc_map.insert(
                iptc::DATE_CREATED.to_string(),
                TagValue::Text(iptc_date_string(self.date_taken)),
            );
            iptc_map.insert(
                iptc::TIME_CREATED.to_string(),
                TagValue::Text(iptc_time_string(self.date_taken)),
            );
        }
        if policy == WritePolicy::Unconditional {
            iptc_map.insert(
                iptc::DIGITAL_CREATION_DATE.to_string(),
                TagValue::Text(iptc_date_string(saved_at)),
            );
            iptc_map.insert(
                iptc::DIGITAL_CREATION_TIME.to_string(),
                TagValue::Text(iptc_time_string(saved_at)),
            );
        }

        for field in self.iptc.iter().filter(|field| policy.includes(field)) {
            let value = match field.key.as_str() {
                iptc::KEYWORDS | iptc::BYLINE => TagValue::from(split_comma_list(field.value())),
                _ => TagValue::Text(field.value().to_string()),
            };
            iptc_map.insert(field.key.clone(), value);
        }

        let mut exif_map: BTreeMap<String, TagValue> = BTreeMap::new();
        let mut tiff_map: BTreeMap<String, TagValue> = BTreeMap::new();
        for field in self.exif.iter().filter(|field| policy.includes(field)) {
            let value = encode_scalar(field.value());
            if TIFF_ROUTED_KEYS.contains(&field.key.as_str()) {
                tiff_map.insert(field.key.clone(), value);
            } else {
                exif_map.insert(field.key.clone(), value);
            }
        }

        if !iptc_map.is_empty() {
            updates.set_group(GROUP_IPTC, iptc_map);
        }
        if !exif_map.is_empty() {
            updates.set_group(GROUP_EXIF, exif_map);
        }
        if !tiff_map.is_empty() {
            updates.set_group(GROUP_TIFF, tiff_map);
        }
        updates
    }
}

/// Numeric tags parse as numbers; anything else stays a string.
fn encode_scalar(raw: &str) -> TagValue {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => TagValue::Number(n),
        _ => TagValue::Text(raw.to_string()),
    }
}

/// Resolve the session's initial date-taken: IPTC date/time pair, then
/// EXIF DateTimeOriginal, then the current time. Never fails outward.
pub fn resolve_date_taken(dict: &TagDictionary) -> NaiveDateTime {
    let iptc_pair = (
        dict.group_value(GROUP_IPTC, iptc::DATE_CREATED)
            .and_then(TagValue::as_str),
        dict.group_value(GROUP_IPTC, iptc::TIME_CREATED)
            .and_then(TagValue::as_str),
    );
    if let (Some(date), Some(time)) = iptc_pair {
        if let Some(parsed) = parse_iptc_datetime(date, time) {
            return parsed;
        }
    }

    if let Some(parsed) = dict
        .group_value(GROUP_EXIF, exif::DATE_TIME_ORIGINAL)
        .and_then(TagValue::as_str)
        .and_then(parse_exif_datetime)
    {
        return parsed;
    }

    Utc::now().naive_utc()
}

/// Project the editable EXIF field set: the EXIF group merged over TIFF,
/// EXIF winning on key collision, so TIFF-routed fields (Make, Model,
/// Software) surface alongside the EXIF ones.
pub fn project_exif_fields(dict: &TagDictionary) -> FieldSet {
    let mut merged: BTreeMap<String, TagValue> = dict.group(GROUP_TIFF).cloned().unwrap_or_default();
    if let Some(exif_group) = dict.group(GROUP_EXIF) {
        for (key, value) in exif_group {
            merged.insert(key.clone(), value.clone());
        }
    }
    FieldSet::project(Some(&merged), EDITABLE_EXIF_MAP)
}

/// One single-image edit transaction over a `TagStore` snapshot.
pub struct EditSession {
    store: TagStore,
    snapshot: TagDictionary,
    state: FieldEditState,
    coordinate: Option<Coordinate>,
    phase: SessionPhase,
}

impl EditSession {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let store = TagStore::new(path.as_ref());
        let snapshot = store.load();
        let state = FieldEditState::new(
            FieldSet::project(snapshot.group(GROUP_IPTC), EDITABLE_IPTC_MAP),
            project_exif_fields(&snapshot),
            resolve_date_taken(&snapshot),
        );
        let coordinate = snapshot.group(GROUP_GPS).and_then(parse_gps_group);

        Self {
            store,
            snapshot,
            state,
            coordinate,
            phase: SessionPhase::Loaded,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn snapshot(&self) -> &TagDictionary {
        &self.snapshot
    }

    pub fn state(&self) -> &FieldEditState {
        &self.state
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn date_taken(&self) -> NaiveDateTime {
        self.state.date_taken()
    }

    /// Fields visible under a metadata filter. `Essentials` is a filtered
    /// view over the IPTC set.
    pub fn visible_fields(&self, filter: MetadataFilter) -> Vec<&EditableField> {
        match filter {
            MetadataFilter::All => self
                .state
                .iptc
                .iter()
                .chain(self.state.exif.iter())
                .collect(),
            MetadataFilter::Iptc => self.state.iptc.iter().collect(),
            MetadataFilter::Exif => self.state.exif.iter().collect(),
            MetadataFilter::Essentials => self.state.iptc.subset(ESSENTIALS_KEYS),
        }
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> bool {
        let written = self.state.set_field(key, value);
        if written {
            self.phase = SessionPhase::Editing;
        }
        written
    }

    pub fn set_date_taken(&mut self, date: NaiveDateTime) {
        self.state.set_date_taken(date);
        self.phase = SessionPhase::Editing;
    }

    pub fn set_coordinate(&mut self, coordinate: Option<Coordinate>) {
        self.coordinate = coordinate;
        self.phase = SessionPhase::Editing;
    }

    /// Persist the session. Every field value is written; GPS is written
    /// from the current coordinate or cleared outright when none is set.
    pub fn save_changes(&mut self) -> Result<()> {
        let now = Utc::now().naive_utc();
        let mut updates = self.state.build_update(WritePolicy::Unconditional, now);
        match self.coordinate {
            Some(coordinate) => updates.set_group(GROUP_GPS, gps_group(coordinate)),
            None => updates.set_group(GROUP_GPS, BTreeMap::new()),
        }

        self.store.save(&updates)?;
        self.snapshot = self.store.load();
        self.phase = SessionPhase::Saved;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.phase = SessionPhase::Cancelled;
    }
}

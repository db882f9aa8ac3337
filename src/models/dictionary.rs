use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::TagValue;

/// Well-known top-level group keys of an image property dictionary. Any
/// other root key (vendor/maker groups included) passes through untouched.
pub const GROUP_IPTC: &str = "IPTC";
pub const GROUP_EXIF: &str = "EXIF";
pub const GROUP_TIFF: &str = "TIFF";
pub const GROUP_GPS: &str = "GPS";

/// Snapshot of one image's property dictionary: root keys map to scalar
/// values or nested tag groups.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagDictionary(BTreeMap<String, TagValue>);

impl TagDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: TagValue) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<TagValue> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TagValue)> {
        self.0.iter()
    }

    /// Nested tag group at `key`, or `None` if absent or not a group.
    pub fn group(&self, key: &str) -> Option<&BTreeMap<String, TagValue>> {
        self.0.get(key).and_then(TagValue::as_map)
    }

    /// One tag inside a named group.
    pub fn group_value(&self, group: &str, key: &str) -> Option<&TagValue> {
        self.group(group).and_then(|map| map.get(key))
    }

    pub fn set_group(&mut self, key: impl Into<String>, group: BTreeMap<String, TagValue>) {
        self.0.insert(key.into(), TagValue::Map(group));
    }

    /// Set one tag inside a named group, creating the group if needed.
    pub fn set_group_value(&mut self, group: &str, key: impl Into<String>, value: TagValue) {
        match self.0.get_mut(group) {
            Some(TagValue::Map(map)) => {
                map.insert(key.into(), value);
            }
            _ => {
                let mut map = BTreeMap::new();
                map.insert(key.into(), value);
                self.0.insert(group.to_string(), TagValue::Map(map));
            }
        }
    }

    /// Deep-merge an update dictionary onto this one, key by key: an empty
    /// group deletes the group, a group merges by inner key with the update
    /// winning, and anything else replaces the existing value. Keys absent
    /// from `updates` are left alone.
    pub fn apply_update(&mut self, updates: &TagDictionary) {
        for (key, updated) in updates.iter() {
            match updated {
                TagValue::Map(inner) if inner.is_empty() => {
                    self.0.remove(key);
                }
                TagValue::Map(inner) => {
                    if let Some(TagValue::Map(existing)) = self.0.get_mut(key) {
                        for (inner_key, value) in inner {
                            existing.insert(inner_key.clone(), value.clone());
                        }
                    } else {
                        self.0.insert(key.clone(), updated.clone());
                    }
                }
                other => {
                    self.0.insert(key.clone(), other.clone());
                }
            }
        }
    }
}

impl FromIterator<(String, TagValue)> for TagDictionary {
    fn from_iter<I: IntoIterator<Item = (String, TagValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

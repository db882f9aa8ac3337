use std::collections::BTreeMap;

use crate::models::TagValue;

/// UI-facing projection of one tag key into a labeled, human-editable
/// string. `is_modified` flips the first time the value is written and
/// never reverts within the same editing session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EditableField {
    pub key: String,
    pub label: String,
    value: String,
    is_modified: bool,
}

impl EditableField {
    pub fn new(key: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value: value.into(),
            is_modified: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.is_modified = true;
    }
}

/// One ordered array of editable fields produced from a curated key map.
/// Field order equals key-map order and is used directly for layout.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldSet {
    fields: Vec<EditableField>,
}

impl FieldSet {
    /// Project a tag group through a `(key, label)` map. Absent tags become
    /// empty strings; values use the round-trippable raw rendering, not the
    /// decorated display formatting.
    pub fn project(group: Option<&BTreeMap<String, TagValue>>, key_map: &[(&str, &str)]) -> Self {
        let fields = key_map
            .iter()
            .map(|(key, label)| {
                let value = group
                    .and_then(|map| map.get(*key))
                    .map(|raw| raw.join(", "))
                    .unwrap_or_default();
                EditableField::new(*key, *label, value)
            })
            .collect();

        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditableField> {
        self.fields.iter()
    }

    pub fn field(&self, key: &str) -> Option<&EditableField> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn field_by_label(&self, label: &str) -> Option<&EditableField> {
        self.fields
            .iter()
            .find(|field| field.label.eq_ignore_ascii_case(label))
    }

    /// Write through to the backing entry by key, dirty-flagging it.
    /// Returns false if no field carries the key.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|field| field.key == key) {
            Some(field) => {
                field.set_value(value);
                true
            }
            None => false,
        }
    }

    pub fn set_value_by_label(&mut self, label: &str, value: impl Into<String>) -> bool {
        match self
            .fields
            .iter_mut()
            .find(|field| field.label.eq_ignore_ascii_case(label))
        {
            Some(field) => {
                field.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Filtered view over a restricted key subset, in subset order. Writes
    /// still go through `set_value` so the backing entry is the one that
    /// gets dirty-flagged.
    pub fn subset<'a>(&'a self, keys: &[&str]) -> Vec<&'a EditableField> {
        keys.iter().filter_map(|key| self.field(key)).collect()
    }

    /// Blank every field and reset dirty flags. Batch sessions start from
    /// blank fields so "blank + unmodified" unambiguously means "do not
    /// touch this field".
    pub fn clear_values(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.is_modified = false;
        }
    }

    pub fn any_modified(&self) -> bool {
        self.fields.iter().any(|field| field.is_modified)
    }
}

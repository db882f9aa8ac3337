//! Read-only inspector projection: one ordered list of titled sections,
//! every value already formatted for display.

use std::collections::BTreeMap;

use crate::models::{TagDictionary, TagValue, GROUP_EXIF, GROUP_GPS, GROUP_IPTC, GROUP_TIFF};

use super::format;
use super::keys::{
    EDITABLE_IPTC_MAP, EXIF_CAMERA_NOTES_MAP, EXIF_CAMERA_SETTINGS_MAP, EXIF_IMAGE_QUALITY_MAP,
    EXIF_IMAGE_SETTINGS_MAP, EXIF_LENS_INFO_MAP, EXIF_TIMESTAMP_MAP, GENERAL_MAP, GPS_MAP,
    TIFF_CAMERA_INFO_MAP,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplayItem {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplaySection {
    pub title: String,
    pub items: Vec<DisplayItem>,
}

impl DisplaySection {
    fn new(title: &str, items: Vec<DisplayItem>) -> Self {
        Self {
            title: title.to_string(),
            items,
        }
    }

    pub fn item(&self, label: &str) -> Option<&DisplayItem> {
        self.items.iter().find(|item| item.label == label)
    }
}

type Formatter = fn(&str, Option<&TagValue>) -> String;

fn group_items(
    group: Option<&BTreeMap<String, TagValue>>,
    key_map: &[(&str, &str)],
    formatter: Formatter,
) -> Vec<DisplayItem> {
    key_map
        .iter()
        .map(|(key, label)| DisplayItem {
            label: (*label).to_string(),
            value: formatter(key, group.and_then(|map| map.get(*key))),
        })
        .collect()
}

fn root_items(dict: &TagDictionary, key_map: &[(&str, &str)], formatter: Formatter) -> Vec<DisplayItem> {
    key_map
        .iter()
        .map(|(key, label)| DisplayItem {
            label: (*label).to_string(),
            value: formatter(key, dict.get(key)),
        })
        .collect()
}

fn format_plain(_key: &str, value: Option<&TagValue>) -> String {
    format::format_value(value)
}

/// Project a property dictionary into its inspector sections, in fixed
/// order. Absent or empty values render `-`; sections are always present
/// so the layout stays stable across photos.
pub fn build_sections(dict: &TagDictionary) -> Vec<DisplaySection> {
    let iptc = dict.group(GROUP_IPTC);
    let exif = dict.group(GROUP_EXIF);
    let tiff = dict.group(GROUP_TIFF);
    let gps = dict.group(GROUP_GPS);

    let mut camera_info = group_items(tiff, TIFF_CAMERA_INFO_MAP, format_plain);
    camera_info.extend(group_items(exif, EXIF_CAMERA_NOTES_MAP, format_plain));

    vec![
        DisplaySection::new("IPTC", group_items(iptc, EDITABLE_IPTC_MAP, format::format_iptc)),
        DisplaySection::new(
            "Timestamps",
            group_items(exif, EXIF_TIMESTAMP_MAP, format::format_exif_date),
        ),
        DisplaySection::new(
            "Camera Settings",
            group_items(exif, EXIF_CAMERA_SETTINGS_MAP, format::format_technical),
        ),
        DisplaySection::new(
            "Image Quality",
            group_items(exif, EXIF_IMAGE_QUALITY_MAP, format::format_technical),
        ),
        DisplaySection::new(
            "Image Settings",
            group_items(exif, EXIF_IMAGE_SETTINGS_MAP, format::format_technical),
        ),
        DisplaySection::new(
            "Lens Info",
            group_items(exif, EXIF_LENS_INFO_MAP, format_plain),
        ),
        DisplaySection::new("Camera Info", camera_info),
        DisplaySection::new("GPS", group_items(gps, GPS_MAP, format_plain)),
        DisplaySection::new("General", root_items(dict, GENERAL_MAP, format::format_general)),
    ]
}

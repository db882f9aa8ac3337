use std::collections::BTreeMap;

use metacat::core::display::build_sections;
use metacat::models::{TagDictionary, TagValue, GROUP_EXIF, GROUP_TIFF};

fn sample_dict() -> TagDictionary {
    let mut dict = TagDictionary::new();

    let mut exif: BTreeMap<String, TagValue> = BTreeMap::new();
    exif.insert("ExposureProgram".to_string(), TagValue::from(3i64));
    exif.insert("WhiteBalance".to_string(), TagValue::from(99i64));
    exif.insert("ExposureTime".to_string(), TagValue::Number(0.004));
    exif.insert(
        "DateTimeOriginal".to_string(),
        TagValue::from("2023:08:01 12:30:45"),
    );
    exif.insert("UserComment".to_string(), TagValue::from("golden hour"));
    dict.set(GROUP_EXIF, TagValue::Map(exif));

    let mut tiff: BTreeMap<String, TagValue> = BTreeMap::new();
    tiff.insert("Make".to_string(), TagValue::from("Canon"));
    dict.set(GROUP_TIFF, TagValue::Map(tiff));

    dict.set("Orientation", TagValue::from(6i64));
    dict.set("ColorModel", TagValue::from("RGB"));
    dict
}

#[test]
fn sections_come_out_in_fixed_order() {
    let titles: Vec<String> = build_sections(&TagDictionary::new())
        .into_iter()
        .map(|section| section.title)
        .collect();
    assert_eq!(
        titles,
        vec![
            "IPTC",
            "Timestamps",
            "Camera Settings",
            "Image Quality",
            "Image Settings",
            "Lens Info",
            "Camera Info",
            "GPS",
            "General",
        ]
    );
}

#[test]
fn values_format_with_the_matching_formatter_family() {
    let sections = build_sections(&sample_dict());

    let camera_settings = sections
        .iter()
        .find(|section| section.title == "Camera Settings")
        .expect("camera settings section");
    assert_eq!(
        camera_settings.item("Exposure Program").expect("item").value,
        "Aperture Priority"
    );
    assert_eq!(
        camera_settings.item("White Balance").expect("item").value,
        "Unrecognized (99)"
    );
    assert_eq!(
        camera_settings.item("Exposure Time").expect("item").value,
        "1/250s"
    );

    let timestamps = sections
        .iter()
        .find(|section| section.title == "Timestamps")
        .expect("timestamps section");
    assert_eq!(
        timestamps.item("Date Taken").expect("item").value,
        "2023/08/01, 12:30:45"
    );

    let general = sections
        .iter()
        .find(|section| section.title == "General")
        .expect("general section");
    assert_eq!(general.item("Orientation").expect("item").value, "Right-top");
    assert_eq!(general.item("Color Model").expect("item").value, "RGB");
}

#[test]
fn camera_info_combines_tiff_fields_with_exif_notes() {
    let sections = build_sections(&sample_dict());
    let camera_info = sections
        .iter()
        .find(|section| section.title == "Camera Info")
        .expect("camera info section");

    assert_eq!(camera_info.item("Camera Make").expect("item").value, "Canon");
    assert_eq!(
        camera_info.item("User Comment").expect("item").value,
        "golden hour"
    );
}

#[test]
fn absent_values_render_a_dash_everywhere() {
    let sections = build_sections(&TagDictionary::new());
    for section in sections {
        for item in section.items {
            assert_eq!(item.value, "-", "{} should be absent", item.label);
        }
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use metacat::core::io::{normalize_orientation, TagStore};
use metacat::models::{TagDictionary, TagValue, GROUP_EXIF, GROUP_GPS, GROUP_IPTC, GROUP_TIFF};

fn exif_updates(entries: &[(&str, TagValue)]) -> TagDictionary {
    let mut updates = TagDictionary::new();
    let group: BTreeMap<String, TagValue> = entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    updates.set(GROUP_EXIF, TagValue::Map(group));
    updates
}

// Structurally valid JPEG: SOI, JFIF APP0, SOS with a few entropy bytes,
// EOI. Enough for segment surgery without a codec.
fn minimal_jpeg() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    bytes.extend_from_slice(b"JFIF\0");
    bytes.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    bytes.extend_from_slice(&[0x12, 0x34, 0x56]);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

// Same, with one fake EXIF APP1 spliced in before the scan data.
fn minimal_jpeg_with_exif() -> Vec<u8> {
    let mut bytes = minimal_jpeg();
    let payload = b"Exif\0\0fakedata";
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() as u16 + 2).to_be_bytes()));
    segment.extend_from_slice(payload);

    let scan_start = bytes
        .windows(2)
        .position(|window| window == [0xFF, 0xDA])
        .expect("scan marker present");
    bytes.splice(scan_start..scan_start, segment);
    bytes
}

fn write_photo(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"not-really-a-jpeg").expect("should create photo file");
    path
}

#[test]
fn sidecar_path_appends_suffix_to_full_filename() {
    let sidecar = TagStore::sidecar_path(Path::new("/photos/IMG_01.jpg"));
    assert_eq!(
        sidecar,
        Path::new("/photos/IMG_01.jpg.metacat.json").to_path_buf()
    );
}

#[test]
fn load_without_properties_yields_empty_dictionary() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_photo(dir.path(), "plain.jpg");

    let dict = TagStore::new(&path).load();
    assert!(dict.is_empty());
}

#[test]
fn save_then_load_round_trips_through_the_sidecar() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_photo(dir.path(), "photo.jpg");
    let store = TagStore::new(&path);

    let updates = exif_updates(&[
        ("ISO", TagValue::from(200i64)),
        ("LensModel", TagValue::from("EF 50mm")),
    ]);
    store.save(&updates).expect("save should succeed");

    assert!(TagStore::sidecar_path(&path).exists());
    let loaded = store.load();
    assert_eq!(
        loaded.group_value(GROUP_EXIF, "ISO"),
        Some(&TagValue::from(200i64))
    );
    assert_eq!(
        loaded.group_value(GROUP_EXIF, "LensModel"),
        Some(&TagValue::from("EF 50mm"))
    );
}

#[test]
fn no_op_save_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_photo(dir.path(), "photo.jpg");
    let store = TagStore::new(&path);

    store
        .save(&exif_updates(&[("ISO", TagValue::from(400i64))]))
        .expect("initial save");
    let before = store.load();

    store
        .save(&TagDictionary::new())
        .expect("empty save should succeed");
    assert_eq!(store.load(), before);
}

#[test]
fn saves_merge_by_inner_key_and_empty_group_deletes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_photo(dir.path(), "photo.jpg");
    let store = TagStore::new(&path);

    store
        .save(&exif_updates(&[
            ("ISO", TagValue::from(100i64)),
            ("Make", TagValue::from("X")),
        ]))
        .expect("first save");
    store
        .save(&exif_updates(&[("ISO", TagValue::from(200i64))]))
        .expect("second save");

    let merged = store.load();
    let group = merged.group(GROUP_EXIF).expect("group should exist");
    assert_eq!(group.get("ISO"), Some(&TagValue::from(200i64)));
    assert_eq!(group.get("Make"), Some(&TagValue::from("X")));

    store.save(&exif_updates(&[])).expect("removal save");
    assert!(store.load().group(GROUP_EXIF).is_none());
}

#[test]
fn save_on_missing_file_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = TagStore::new(dir.path().join("absent.jpg"));
    assert!(store.save(&TagDictionary::new()).is_err());
}

#[test]
fn strip_removes_metadata_segments_and_sidecar() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("strip_me.jpg");
    fs::write(&path, minimal_jpeg_with_exif()).expect("should create jpeg");

    let store = TagStore::new(&path);
    store
        .save(&exif_updates(&[("ISO", TagValue::from(64i64))]))
        .expect("sidecar save");
    assert!(TagStore::sidecar_path(&path).exists());

    store.strip_all_metadata().expect("strip should succeed");

    let stripped = fs::read(&path).expect("stripped file should exist");
    assert_eq!(&stripped[..2], &[0xFF, 0xD8]);
    assert!(contains(&stripped, b"JFIF"));
    assert!(!contains(&stripped, b"fakedata"));
    assert!(!TagStore::sidecar_path(&path).exists());
}

#[test]
fn strip_temp_file_is_scoped_to_the_full_filename() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("strip_me.jpg");
    fs::write(&path, minimal_jpeg_with_exif()).expect("should create jpeg");

    // A sibling that an extension-replacing temp path would clobber.
    let decoy = dir.path().join("strip_me.metacat.tmp");
    fs::write(&decoy, b"decoy").expect("should create decoy");

    TagStore::new(&path).strip_all_metadata().expect("strip should succeed");

    assert_eq!(fs::read(&decoy).expect("decoy survives"), b"decoy");
    assert!(!dir.path().join("strip_me.jpg.metacat.tmp").exists());
}

#[test]
fn gps_removal_clears_the_embedded_mirror() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("located.jpg");
    fs::write(&path, minimal_jpeg()).expect("should create jpeg");
    let store = TagStore::new(&path);

    let mut placement = TagDictionary::new();
    let mut gps: BTreeMap<String, TagValue> = BTreeMap::new();
    gps.insert("Latitude".to_string(), TagValue::Number(10.0));
    gps.insert("LatitudeRef".to_string(), TagValue::from("N"));
    gps.insert("Longitude".to_string(), TagValue::Number(20.0));
    gps.insert("LongitudeRef".to_string(), TagValue::from("E"));
    placement.set(GROUP_GPS, TagValue::Map(gps));
    store.save(&placement).expect("placement save");

    // Drop the sidecar so loads fall back to the embedded payload.
    fs::remove_file(TagStore::sidecar_path(&path)).expect("drop sidecar");
    assert!(store.load().group(GROUP_GPS).is_some());

    let mut removal = TagDictionary::new();
    removal.set(GROUP_GPS, TagValue::Map(BTreeMap::new()));
    store.save(&removal).expect("removal save");

    fs::remove_file(TagStore::sidecar_path(&path)).expect("drop sidecar again");
    assert!(store.load().group(GROUP_GPS).is_none());
}

#[test]
fn strip_on_invalid_jpeg_errors_and_leaves_original_in_place() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_photo(dir.path(), "broken.jpg");

    let store = TagStore::new(&path);
    assert!(store.strip_all_metadata().is_err());
    assert_eq!(
        fs::read(&path).expect("original should survive"),
        b"not-really-a-jpeg"
    );
}

#[test]
fn normalize_orientation_forces_upright_in_root_and_tiff() {
    let mut dict = TagDictionary::new();
    dict.set("Orientation", TagValue::from(6i64));
    let mut tiff: BTreeMap<String, TagValue> = BTreeMap::new();
    tiff.insert("Orientation".to_string(), TagValue::from(6i64));
    dict.set(GROUP_TIFF, TagValue::Map(tiff));

    normalize_orientation(&mut dict);

    assert_eq!(dict.get("Orientation"), Some(&TagValue::from(1i64)));
    assert_eq!(
        dict.group_value(GROUP_TIFF, "Orientation"),
        Some(&TagValue::from(1i64))
    );
}

#[test]
fn unknown_root_keys_survive_saves() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_photo(dir.path(), "vendor.jpg");
    let store = TagStore::new(&path);

    let mut first = TagDictionary::new();
    let mut vendor: BTreeMap<String, TagValue> = BTreeMap::new();
    vendor.insert("RunTime".to_string(), TagValue::from(9i64));
    first.set("MakerApple", TagValue::Map(vendor));
    store.save(&first).expect("vendor save");

    let mut second = TagDictionary::new();
    let mut iptc: BTreeMap<String, TagValue> = BTreeMap::new();
    iptc.insert("ObjectName".to_string(), TagValue::from("Pier"));
    second.set(GROUP_IPTC, TagValue::Map(iptc));
    store.save(&second).expect("iptc save");

    let loaded = store.load();
    assert!(loaded.group("MakerApple").is_some());
    assert_eq!(
        loaded.group_value(GROUP_IPTC, "ObjectName"),
        Some(&TagValue::from("Pier"))
    );
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

use std::fs;
use std::path::Path;

use metacat::core::catalog::{ingestion_timestamp, Catalog};
use metacat::models::{CatalogConfig, SortOrder, TagValue, GROUP_IPTC};

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"pixels").expect("should create file");
}

fn filenames(catalog: &Catalog) -> Vec<String> {
    catalog
        .records()
        .iter()
        .map(|record| record.filename())
        .collect()
}

#[test]
fn reload_enumerates_only_jpeg_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "IMG_Metacat_00_1000.jpg");
    touch(dir.path(), "scan.JPEG");
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "raw.dng");

    let catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    assert_eq!(catalog.len(), 2);
}

#[test]
fn recently_added_sorts_descending_by_filename_timestamp() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "IMG_Metacat_01_1000.jpg");
    touch(dir.path(), "IMG_Metacat_00_3000.jpg");
    touch(dir.path(), "IMG_Metacat_02_2000.jpg");
    touch(dir.path(), "holiday.jpg");

    let catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    assert_eq!(
        filenames(&catalog),
        vec![
            "IMG_Metacat_00_3000.jpg",
            "IMG_Metacat_02_2000.jpg",
            "IMG_Metacat_01_1000.jpg",
            "holiday.jpg",
        ]
    );
}

#[test]
fn equal_timestamps_preserve_input_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "IMG_A_00_500.jpg");
    touch(dir.path(), "IMG_B_00_500.jpg");

    let catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    assert_eq!(
        filenames(&catalog),
        vec!["IMG_A_00_500.jpg", "IMG_B_00_500.jpg"]
    );
}

#[test]
fn nonconforming_names_parse_as_timestamp_zero() {
    assert_eq!(ingestion_timestamp(Path::new("holiday.jpg")), 0);
    assert_eq!(ingestion_timestamp(Path::new("IMG_Metacat_00.jpg")), 0);
    assert_eq!(
        ingestion_timestamp(Path::new("IMG_Metacat_00_1234.jpg")),
        1234
    );
}

#[test]
fn date_captured_sort_puts_missing_dates_last() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "a.jpg");
    touch(dir.path(), "b.jpg");
    touch(dir.path(), "c.jpg");
    fs::write(
        dir.path().join("a.jpg.metacat.json"),
        r#"{"EXIF":{"DateTimeOriginal":"2021:01:01 00:00:00"}}"#,
    )
    .expect("sidecar a");
    fs::write(
        dir.path().join("c.jpg.metacat.json"),
        r#"{"EXIF":{"DateTimeOriginal":"2023:01:01 00:00:00"}}"#,
    )
    .expect("sidecar c");

    let config = CatalogConfig {
        sort_order: SortOrder::DateCaptured,
        ..CatalogConfig::default()
    };
    let catalog = Catalog::open(dir.path(), config).expect("open catalog");
    assert_eq!(filenames(&catalog), vec!["c.jpg", "a.jpg", "b.jpg"]);
}

#[test]
fn add_image_uses_the_filename_convention_and_resorts() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "IMG_Metacat_00_1000.jpg");

    let mut catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    let path = catalog.add_image(b"new-pixels", 7).expect("add image");

    let name = path.file_name().expect("name").to_string_lossy().to_string();
    assert!(name.starts_with("IMG_Metacat_07_"));
    assert!(name.ends_with(".jpg"));
    assert!(ingestion_timestamp(&path) > 1000);

    assert_eq!(catalog.len(), 2);
    // Fresh ingestion timestamp sorts first under the default order.
    assert_eq!(filenames(&catalog)[0], name);
}

#[test]
fn selection_is_keyed_by_id_and_survives_resorts() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "IMG_Metacat_00_2000.jpg");
    touch(dir.path(), "IMG_Metacat_01_1000.jpg");

    let mut catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    let id = catalog.records()[1].id.clone();
    assert!(catalog.toggle_selection(&id));
    assert!(catalog.is_selected(&id));
    assert!(!catalog.toggle_selection("no-such-id"));

    catalog.set_sort_order(SortOrder::DateCaptured);
    assert!(catalog.is_selected(&id));
    assert_eq!(catalog.selection_len(), 1);

    assert!(catalog.toggle_selection(&id));
    assert!(!catalog.is_selected(&id));

    catalog.select_all();
    assert_eq!(catalog.selection_len(), 2);
    catalog.clear_selection();
    assert_eq!(catalog.selection_len(), 0);
}

#[test]
fn batch_validation_enforces_the_size_cap() {
    let dir = tempfile::tempdir().expect("temp dir");
    for index in 0..3 {
        touch(dir.path(), &format!("IMG_Metacat_{index:02}_{index}000.jpg"));
    }

    let config = CatalogConfig {
        max_batch_size: 2,
        ..CatalogConfig::default()
    };
    let mut catalog = Catalog::open(dir.path(), config).expect("open catalog");

    assert!(!catalog.can_edit_batch());
    assert!(catalog.validate_batch().is_err());

    let id = catalog.records()[0].id.clone();
    catalog.toggle_selection(&id);
    assert!(catalog.can_edit_batch());
    assert_eq!(catalog.validate_batch().expect("valid batch").len(), 1);

    catalog.select_all();
    assert!(!catalog.can_edit_batch());
    assert!(catalog.validate_batch().is_err());
}

#[test]
fn delete_selected_removes_files_records_and_selection_ids() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "IMG_Metacat_00_2000.jpg");
    touch(dir.path(), "IMG_Metacat_01_1000.jpg");

    let mut catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    let id = catalog.records()[0].id.clone();
    let path = catalog.records()[0].path.clone();
    catalog.toggle_selection(&id);

    let outcome = catalog.delete_selected();
    assert_eq!(outcome.removed, 1);
    assert!(outcome.all_removed());
    assert!(!path.exists());
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.selection_len(), 0);
}

#[test]
fn already_missing_files_still_count_as_removed() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "IMG_Metacat_00_2000.jpg");
    touch(dir.path(), "IMG_Metacat_01_1000.jpg");

    let mut catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    catalog.select_all();

    // One photo disappears behind the catalog's back.
    fs::remove_file(dir.path().join("IMG_Metacat_01_1000.jpg")).expect("external delete");

    let outcome = catalog.delete_selected();
    assert_eq!(outcome.removed, 2);
    assert_eq!(outcome.failed, 0);
    assert!(catalog.is_empty());
    assert_eq!(catalog.selection_len(), 0);
}

#[test]
fn failed_unlinks_keep_records_and_selection_for_retry() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "IMG_Metacat_00_2000.jpg");
    touch(dir.path(), "IMG_Metacat_01_1000.jpg");

    let mut catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    catalog.select_all();

    // Swap one photo for a directory so its unlink fails.
    let blocked = dir.path().join("IMG_Metacat_00_2000.jpg");
    fs::remove_file(&blocked).expect("clear path");
    fs::create_dir(&blocked).expect("block path");

    let outcome = catalog.delete_selected();
    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].0, blocked);
    assert!(!outcome.all_removed());

    // The failed photo survives in the catalog and the selection.
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.records()[0].path, blocked);
    assert_eq!(catalog.selection_len(), 1);
    let surviving = catalog.records()[0].id.clone();
    assert!(catalog.is_selected(&surviving));
}

#[test]
fn ensure_metadata_loads_lazily_from_the_sidecar() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "lazy.jpg");
    fs::write(
        dir.path().join("lazy.jpg.metacat.json"),
        r#"{"IPTC":{"ObjectName":"Pier"}}"#,
    )
    .expect("sidecar");

    let mut catalog = Catalog::open(dir.path(), CatalogConfig::default()).expect("open catalog");
    assert!(catalog.records()[0].metadata.is_none());

    let id = catalog.records()[0].id.clone();
    let dict = catalog.ensure_metadata(&id).expect("metadata loads");
    assert_eq!(
        dict.group_value(GROUP_IPTC, "ObjectName"),
        Some(&TagValue::from("Pier"))
    );
    assert!(catalog.ensure_metadata("no-such-id").is_none());
}

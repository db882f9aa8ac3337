//! Tag dictionary persistence for one image: JSON sidecar as the
//! round-trip authority, embedded EXIF as the fallback read path and the
//! best-effort write mirror, plus the full metadata wipe.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use img_parts::jpeg::Jpeg;
use img_parts::Bytes;
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata as ExifMetadata;
use little_exif::rational::{iR64, uR64};
use log::{debug, warn};

use crate::models::{TagDictionary, TagValue, GROUP_EXIF, GROUP_GPS, GROUP_TIFF};

use super::keys::{exif, gps, parse_gps_group, root, tiff};

#[derive(Debug)]
pub enum StoreError {
    FileNotFound(PathBuf),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Image(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Serialization(err) => write!(f, "sidecar serialization error: {err}"),
            Self::Image(err) => write!(f, "image rewrite error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence handle for one image path.
pub struct TagStore {
    path: PathBuf,
}

impl TagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sidecar_path(path: &Path) -> PathBuf {
        let base_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("photo"));

        path.with_file_name(format!("{base_name}.metacat.json"))
    }

    /// Current property dictionary. Prefers the sidecar; falls back to the
    /// embedded EXIF/TIFF/GPS payload; a file with no readable properties
    /// yields an empty dictionary plus a logged warning, never an error.
    pub fn load(&self) -> TagDictionary {
        let sidecar = Self::sidecar_path(&self.path);
        if sidecar.exists() {
            let decoded = fs::read_to_string(&sidecar)
                .map_err(StoreError::Io)
                .and_then(|contents| {
                    serde_json::from_str(&contents).map_err(StoreError::Serialization)
                });
            match decoded {
                Ok(dict) => return dict,
                Err(err) => warn!("unreadable sidecar for {}: {err}", self.path.display()),
            }
        }

        match Self::read_embedded(&self.path) {
            Some(dict) => dict,
            None => {
                warn!("no readable properties in {}", self.path.display());
                TagDictionary::new()
            }
        }
    }

    /// Deep-merge `updates` onto the current dictionary and persist. The
    /// sidecar write is atomic (temp file + rename); the embedded mirror is
    /// best-effort and never fails the save.
    pub fn save(&self, updates: &TagDictionary) -> Result<()> {
        if !self.path.exists() {
            return Err(StoreError::FileNotFound(self.path.clone()));
        }

        let mut merged = self.load();
        merged.apply_update(updates);

        let sidecar = Self::sidecar_path(&self.path);
        let temp = sidecar.with_extension("json.tmp");
        let encoded = serde_json::to_string_pretty(&merged)?;
        fs::write(&temp, encoded)?;
        if let Err(err) = fs::rename(&temp, &sidecar) {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::Io(err));
        }

        self.mirror_embedded(&merged);
        Ok(())
    }

    /// Rewrite the JPEG with every metadata APP segment dropped, keeping
    /// only the structural segments (JFIF APP0, Adobe APP14) and the pixel
    /// data. The original file is replaced only after the re-encode
    /// succeeds; the sidecar goes with it.
    pub fn strip_all_metadata(&self) -> Result<()> {
        if !self.path.exists() {
            return Err(StoreError::FileNotFound(self.path.clone()));
        }

        let bytes = fs::read(&self.path)?;
        let mut jpeg = Jpeg::from_bytes(Bytes::from(bytes))
            .map_err(|err| StoreError::Image(err.to_string()))?;
        jpeg.segments_mut()
            .retain(|segment| !is_metadata_segment(segment.marker()));

        // Suffix the full filename like `sidecar_path` does, so `a.jpg` and
        // `a.jpeg` never share a temp file.
        let base_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("photo"));
        let temp = self.path.with_file_name(format!("{base_name}.metacat.tmp"));
        let output = jpeg.encoder().bytes();
        if let Err(err) = fs::write(&temp, &output) {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::Io(err));
        }
        if let Err(err) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::Io(err));
        }

        let _ = fs::remove_file(Self::sidecar_path(&self.path));
        Ok(())
    }

    fn read_embedded(path: &Path) -> Option<TagDictionary> {
        let embedded = ExifMetadata::new_from_path(path).ok()?;
        let tags: Vec<&ExifTag> = (&embedded).into_iter().collect();
        if tags.is_empty() {
            return None;
        }

        let mut exif_group: BTreeMap<String, TagValue> = BTreeMap::new();
        let mut tiff_group: BTreeMap<String, TagValue> = BTreeMap::new();
        let mut general: BTreeMap<String, TagValue> = BTreeMap::new();

        let mut lat_ref: Option<String> = None;
        let mut lat_dms: Option<(f64, f64, f64)> = None;
        let mut lon_ref: Option<String> = None;
        let mut lon_dms: Option<(f64, f64, f64)> = None;

        for tag in tags {
            match tag {
                // TIFF strings
                ExifTag::Make(s) => set_text(&mut tiff_group, tiff::MAKE, s),
                ExifTag::Model(s) => set_text(&mut tiff_group, tiff::MODEL, s),
                ExifTag::Software(s) => set_text(&mut tiff_group, tiff::SOFTWARE, s),
                ExifTag::Orientation(v) => {
                    set_code16(&mut tiff_group, tiff::ORIENTATION, v);
                    set_code16(&mut general, root::ORIENTATION, v);
                }

                // EXIF strings
                ExifTag::DateTimeOriginal(s) => {
                    set_text(&mut exif_group, exif::DATE_TIME_ORIGINAL, s)
                }
                ExifTag::CreateDate(s) => set_text(&mut exif_group, exif::DATE_TIME_DIGITIZED, s),
                ExifTag::LensMake(s) => set_text(&mut exif_group, exif::LENS_MAKE, s),
                ExifTag::LensModel(s) => set_text(&mut exif_group, exif::LENS_MODEL, s),
                ExifTag::LensSerialNumber(s) => {
                    set_text(&mut exif_group, exif::LENS_SERIAL_NUMBER, s)
                }

                // Enumerated and integral codes
                ExifTag::ISO(v) => set_code16(&mut exif_group, exif::ISO_SPEED_RATINGS, v),
                ExifTag::ExposureProgram(v) => {
                    set_code16(&mut exif_group, exif::EXPOSURE_PROGRAM, v)
                }
                ExifTag::ExposureMode(v) => set_code16(&mut exif_group, exif::EXPOSURE_MODE, v),
                ExifTag::MeteringMode(v) => set_code16(&mut exif_group, exif::METERING_MODE, v),
                ExifTag::Flash(v) => set_code16(&mut exif_group, exif::FLASH, v),
                ExifTag::ColorSpace(v) => set_code16(&mut exif_group, exif::COLOR_SPACE, v),
                ExifTag::WhiteBalance(v) => set_code16(&mut exif_group, exif::WHITE_BALANCE, v),
                ExifTag::SceneCaptureType(v) => {
                    set_code16(&mut exif_group, exif::SCENE_CAPTURE_TYPE, v)
                }
                ExifTag::SensingMethod(v) => set_code16(&mut exif_group, exif::SENSING_METHOD, v),
                ExifTag::LightSource(v) => set_code16(&mut exif_group, exif::LIGHT_SOURCE, v),
                ExifTag::Contrast(v) => set_code16(&mut exif_group, exif::CONTRAST, v),
                ExifTag::Saturation(v) => set_code16(&mut exif_group, exif::SATURATION, v),
                ExifTag::Sharpness(v) => set_code16(&mut exif_group, exif::SHARPNESS, v),
                ExifTag::CustomRendered(v) => set_code16(&mut exif_group, exif::CUSTOM_RENDERED, v),
                ExifTag::GainControl(v) => set_code16(&mut exif_group, exif::GAIN_CONTROL, v),
                ExifTag::FocalLengthIn35mmFormat(v) => {
                    set_code16(&mut exif_group, exif::FOCAL_LENGTH_35MM, v)
                }
                ExifTag::ImageWidth(v) => {
                    set_code32(&mut exif_group, exif::PIXEL_X_DIMENSION, v);
                    set_code32(&mut general, root::PIXEL_WIDTH, v);
                }
                ExifTag::ImageHeight(v) => {
                    set_code32(&mut exif_group, exif::PIXEL_Y_DIMENSION, v);
                    set_code32(&mut general, root::PIXEL_HEIGHT, v);
                }

                // Unsigned rationals
                ExifTag::ExposureTime(v) => set_ratio(&mut exif_group, exif::EXPOSURE_TIME, v),
                ExifTag::FNumber(v) => set_ratio(&mut exif_group, exif::F_NUMBER, v),
                ExifTag::FocalLength(v) => set_ratio(&mut exif_group, exif::FOCAL_LENGTH, v),
                ExifTag::ApertureValue(v) => set_ratio(&mut exif_group, exif::APERTURE, v),
                ExifTag::MaxApertureValue(v) => set_ratio(&mut exif_group, exif::MAX_APERTURE, v),
                ExifTag::DigitalZoomRatio(v) => set_ratio(&mut exif_group, exif::DIGITAL_ZOOM, v),

                // Signed rationals
                ExifTag::ShutterSpeedValue(v) => {
                    set_signed_ratio(&mut exif_group, exif::SHUTTER_SPEED, v)
                }
                ExifTag::BrightnessValue(v) => {
                    set_signed_ratio(&mut exif_group, exif::BRIGHTNESS, v)
                }
                ExifTag::ExposureCompensation(v) => {
                    set_signed_ratio(&mut exif_group, exif::EXPOSURE_BIAS, v)
                }

                // Byte-array payloads
                ExifTag::ExifVersion(v) => {
                    exif_group.insert(exif::EXIF_VERSION.to_string(), version_list(v));
                }
                ExifTag::FlashpixVersion(v) => {
                    exif_group.insert(exif::FLASHPIX_VERSION.to_string(), version_list(v));
                }
                ExifTag::ComponentsConfiguration(v) => {
                    let items = v.iter().map(|byte| TagValue::from(*byte as i64)).collect();
                    exif_group.insert(
                        exif::COMPONENTS_CONFIGURATION.to_string(),
                        TagValue::List(items),
                    );
                }

                // GPS sub-IFD
                ExifTag::GPSLatitudeRef(s) => lat_ref = Some(clean_string(s)),
                ExifTag::GPSLatitude(rats) if rats.len() >= 3 => {
                    lat_dms = dms_triplet(rats);
                }
                ExifTag::GPSLongitudeRef(s) => lon_ref = Some(clean_string(s)),
                ExifTag::GPSLongitude(rats) if rats.len() >= 3 => {
                    lon_dms = dms_triplet(rats);
                }

                _ => {}
            }
        }

        let mut dict = TagDictionary::new();
        for (key, value) in general {
            dict.set(key, value);
        }
        if !tiff_group.is_empty() {
            dict.set_group(GROUP_TIFF, tiff_group);
        }
        if !exif_group.is_empty() {
            dict.set_group(GROUP_EXIF, exif_group);
        }
        if let (Some(lat), Some(lon)) = (lat_dms, lon_dms) {
            let mut gps_group = BTreeMap::new();
            gps_group.insert(
                gps::LATITUDE.to_string(),
                TagValue::Number(dms_to_decimal(lat.0, lat.1, lat.2)),
            );
            gps_group.insert(
                gps::LATITUDE_REF.to_string(),
                TagValue::from(lat_ref.unwrap_or_else(|| String::from("N"))),
            );
            gps_group.insert(
                gps::LONGITUDE.to_string(),
                TagValue::Number(dms_to_decimal(lon.0, lon.1, lon.2)),
            );
            gps_group.insert(
                gps::LONGITUDE_REF.to_string(),
                TagValue::from(lon_ref.unwrap_or_else(|| String::from("E"))),
            );
            dict.set_group(GROUP_GPS, gps_group);
        }

        if dict.is_empty() {
            None
        } else {
            Some(dict)
        }
    }

    /// Mirror the curated editable subset into the image container so other
    /// tools see the edits. Failures are logged and swallowed; the sidecar
    /// already holds the authoritative state.
    fn mirror_embedded(&self, dict: &TagDictionary) {
        let ext = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "webp") {
            return;
        }

        let mut embedded = match ExifMetadata::new_from_path(&self.path) {
            Ok(e) => e,
            Err(_) => ExifMetadata::new(),
        };

        if let Some(s) = text_tag(dict, GROUP_TIFF, tiff::MAKE) {
            embedded.set_tag(ExifTag::Make(s));
        }
        if let Some(s) = text_tag(dict, GROUP_TIFF, tiff::MODEL) {
            embedded.set_tag(ExifTag::Model(s));
        }
        if let Some(s) = text_tag(dict, GROUP_TIFF, tiff::SOFTWARE) {
            embedded.set_tag(ExifTag::Software(s));
        }
        if let Some(code) = code_tag(dict, GROUP_TIFF, tiff::ORIENTATION) {
            embedded.set_tag(ExifTag::Orientation(vec![code]));
        }

        if let Some(s) = text_tag(dict, GROUP_EXIF, exif::DATE_TIME_ORIGINAL) {
            embedded.set_tag(ExifTag::DateTimeOriginal(s));
        }
        if let Some(s) = text_tag(dict, GROUP_EXIF, exif::DATE_TIME_DIGITIZED) {
            embedded.set_tag(ExifTag::CreateDate(s));
        }
        if let Some(s) = text_tag(dict, GROUP_EXIF, exif::LENS_MAKE) {
            embedded.set_tag(ExifTag::LensMake(s));
        }
        if let Some(s) = text_tag(dict, GROUP_EXIF, exif::LENS_MODEL) {
            embedded.set_tag(ExifTag::LensModel(s));
        }
        if let Some(s) = text_tag(dict, GROUP_EXIF, exif::LENS_SERIAL_NUMBER) {
            embedded.set_tag(ExifTag::LensSerialNumber(s));
        }
        if let Some(code) = code_tag(dict, GROUP_EXIF, exif::ISO_SPEED_RATINGS) {
            embedded.set_tag(ExifTag::ISO(vec![code]));
        }
        if let Some(code) = code_tag(dict, GROUP_EXIF, exif::FOCAL_LENGTH_35MM) {
            embedded.set_tag(ExifTag::FocalLengthIn35mmFormat(vec![code]));
        }
        if let Some(n) = number_tag(dict, GROUP_EXIF, exif::EXPOSURE_TIME) {
            embedded.set_tag(ExifTag::ExposureTime(vec![rational(n)]));
        }
        if let Some(n) = number_tag(dict, GROUP_EXIF, exif::F_NUMBER) {
            embedded.set_tag(ExifTag::FNumber(vec![rational(n)]));
        }
        if let Some(n) = number_tag(dict, GROUP_EXIF, exif::FOCAL_LENGTH) {
            embedded.set_tag(ExifTag::FocalLength(vec![rational(n)]));
        }
        if let Some(n) = number_tag(dict, GROUP_EXIF, exif::DIGITAL_ZOOM) {
            embedded.set_tag(ExifTag::DigitalZoomRatio(vec![rational(n)]));
        }
        if let Some(n) = number_tag(dict, GROUP_EXIF, exif::EXPOSURE_BIAS) {
            embedded.set_tag(ExifTag::ExposureCompensation(vec![signed_rational(n)]));
        }

        match dict.group(GROUP_GPS).and_then(parse_gps_group) {
            Some(coordinate) => {
                write_gps_tags(&mut embedded, coordinate.latitude, coordinate.longitude);
            }
            // A removed location must not linger in the container.
            None => {
                embedded.remove_tag(ExifTag::GPSLatitudeRef(String::new()));
                embedded.remove_tag(ExifTag::GPSLatitude(Vec::new()));
                embedded.remove_tag(ExifTag::GPSLongitudeRef(String::new()));
                embedded.remove_tag(ExifTag::GPSLongitude(Vec::new()));
            }
        }

        if let Err(err) = embedded.write_to_file(&self.path) {
            debug!(
                "embedded mirror skipped for {}: {err}",
                self.path.display()
            );
        }
    }
}

/// Force the orientation tag upright in both the root dictionary and the
/// TIFF group, for saves of re-rendered pixel data.
pub fn normalize_orientation(dict: &mut TagDictionary) {
    dict.set(root::ORIENTATION, TagValue::from(1i64));
    if dict.group(GROUP_TIFF).is_some() {
        dict.set_group_value(GROUP_TIFF, tiff::ORIENTATION, TagValue::from(1i64));
    }
}

// JPEG APP1-APP13, APP15, and COM segments carry metadata; APP0 (JFIF) and
// APP14 (Adobe color transform) are structural and stay.
fn is_metadata_segment(marker: u8) -> bool {
    matches!(marker, 0xE1..=0xED | 0xEF | 0xFE)
}

fn clean_string(s: &str) -> String {
    s.trim_end_matches('\0').trim().to_string()
}

fn set_text(group: &mut BTreeMap<String, TagValue>, key: &str, raw: &str) {
    let cleaned = clean_string(raw);
    if !cleaned.is_empty() {
        group.insert(key.to_string(), TagValue::Text(cleaned));
    }
}

fn set_code16(group: &mut BTreeMap<String, TagValue>, key: &str, values: &[u16]) {
    if let Some(first) = values.first() {
        group.insert(key.to_string(), TagValue::from(*first as i64));
    }
}

fn set_code32(group: &mut BTreeMap<String, TagValue>, key: &str, values: &[u32]) {
    if let Some(first) = values.first() {
        group.insert(key.to_string(), TagValue::from(*first as i64));
    }
}

fn ratio(values: &[uR64]) -> Option<f64> {
    let r = values.first()?;
    if r.denominator == 0 {
        return None;
    }
    Some(r.nominator as f64 / r.denominator as f64)
}

fn signed_ratio(values: &[iR64]) -> Option<f64> {
    let r = values.first()?;
    if r.denominator == 0 {
        return None;
    }
    Some(r.nominator as f64 / r.denominator as f64)
}

fn set_ratio(group: &mut BTreeMap<String, TagValue>, key: &str, values: &[uR64]) {
    if let Some(value) = ratio(values) {
        group.insert(key.to_string(), TagValue::Number(value));
    }
}

fn set_signed_ratio(group: &mut BTreeMap<String, TagValue>, key: &str, values: &[iR64]) {
    if let Some(value) = signed_ratio(values) {
        group.insert(key.to_string(), TagValue::Number(value));
    }
}

fn dms_triplet(rats: &[uR64]) -> Option<(f64, f64, f64)> {
    let d = ratio(&rats[..1])?;
    let m = ratio(&rats[1..2])?;
    let s = ratio(&rats[2..3])?;
    Some((d, m, s))
}

// Version payloads are ASCII digit strings ("0232"); drop the leading zero
// so the list renders as "2.3".
fn version_list(bytes: &[u8]) -> TagValue {
    let text = String::from_utf8_lossy(bytes).to_string();
    let digits: Vec<TagValue> = text
        .trim_start_matches('0')
        .chars()
        .filter_map(|ch| ch.to_digit(10))
        .map(|digit| TagValue::from(digit as i64))
        .collect();

    if digits.is_empty() {
        TagValue::Text(clean_string(&text))
    } else {
        TagValue::List(digits)
    }
}

fn text_tag(dict: &TagDictionary, group: &str, key: &str) -> Option<String> {
    dict.group_value(group, key)
        .and_then(TagValue::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn number_tag(dict: &TagDictionary, group: &str, key: &str) -> Option<f64> {
    dict.group_value(group, key)
        .and_then(TagValue::as_f64)
        .filter(|n| n.is_finite())
}

fn code_tag(dict: &TagDictionary, group: &str, key: &str) -> Option<u16> {
    dict.group_value(group, key)
        .and_then(TagValue::as_code)
        .filter(|code| (0..=i64::from(u16::MAX)).contains(code))
        .map(|code| code as u16)
}

fn write_gps_tags(embedded: &mut ExifMetadata, lat: f64, lon: f64) {
    let lat_ref = if lat >= 0.0 { "N" } else { "S" };
    let lon_ref = if lon >= 0.0 { "E" } else { "W" };

    let (lat_d, lat_m, lat_sn, lat_sd) = decimal_to_dms(lat.abs());
    let (lon_d, lon_m, lon_sn, lon_sd) = decimal_to_dms(lon.abs());

    embedded.set_tag(ExifTag::GPSLatitudeRef(lat_ref.to_string()));
    embedded.set_tag(ExifTag::GPSLatitude(vec![
        ur64(lat_d, 1),
        ur64(lat_m, 1),
        ur64(lat_sn, lat_sd),
    ]));
    embedded.set_tag(ExifTag::GPSLongitudeRef(lon_ref.to_string()));
    embedded.set_tag(ExifTag::GPSLongitude(vec![
        ur64(lon_d, 1),
        ur64(lon_m, 1),
        ur64(lon_sn, lon_sd),
    ]));
}

fn ur64(nominator: u32, denominator: u32) -> uR64 {
    uR64 {
        nominator,
        denominator,
    }
}

// Sub-unit values keep four decimal places of precision; anything larger
// rounds to an integer ratio.
fn rational(value: f64) -> uR64 {
    if !value.is_finite() || value <= 0.0 {
        return ur64(0, 1);
    }
    if value >= 1_000.0 {
        ur64(value.min(u32::MAX as f64).round() as u32, 1)
    } else {
        ur64((value * 10_000.0).round() as u32, 10_000)
    }
}

fn signed_rational(value: f64) -> iR64 {
    if !value.is_finite() {
        return iR64 {
            nominator: 0,
            denominator: 1,
        };
    }
    iR64 {
        nominator: (value.clamp(-200_000.0, 200_000.0) * 10_000.0).round() as i32,
        denominator: 10_000,
    }
}

/// Convert decimal degrees to degrees, minutes, and rational seconds
/// (numerator over 10000).
pub fn decimal_to_dms(decimal: f64) -> (u32, u32, u32, u32) {
    let d = decimal.abs();
    let degrees = d as u32;
    let minutes_full = (d - degrees as f64) * 60.0;
    let minutes = minutes_full as u32;
    let seconds = (minutes_full - minutes as f64) * 60.0;
    let seconds_num = (seconds * 10_000.0).round() as u32;
    (degrees, minutes, seconds_num, 10_000)
}

/// Convert degree/minute/second components back to decimal degrees.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

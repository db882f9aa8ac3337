//! Tag key constants and the curated key maps that drive field projection
//! and the metadata inspector. Fixed data, not user-configurable.

use std::collections::BTreeMap;

use crate::models::{Coordinate, TagValue};

pub mod iptc {
    pub const OBJECT_NAME: &str = "ObjectName";
    pub const HEADLINE: &str = "Headline";
    pub const CAPTION: &str = "Caption/Abstract";
    pub const KEYWORDS: &str = "Keywords";
    pub const CITY: &str = "City";
    pub const PROVINCE_STATE: &str = "Province/State";
    pub const COUNTRY: &str = "Country/PrimaryLocationName";
    pub const BYLINE: &str = "By-line";
    pub const COPYRIGHT_NOTICE: &str = "CopyrightNotice";
    pub const SOURCE: &str = "Source";
    pub const DATE_CREATED: &str = "DateCreated";
    pub const TIME_CREATED: &str = "TimeCreated";
    pub const DIGITAL_CREATION_DATE: &str = "DigitalCreationDate";
    pub const DIGITAL_CREATION_TIME: &str = "DigitalCreationTime";
}

pub mod exif {
    pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
    pub const DATE_TIME_DIGITIZED: &str = "DateTimeDigitized";
    pub const EXPOSURE_PROGRAM: &str = "ExposureProgram";
    pub const EXPOSURE_MODE: &str = "ExposureMode";
    pub const EXPOSURE_BIAS: &str = "ExposureBiasValue";
    pub const EXPOSURE_TIME: &str = "ExposureTime";
    pub const SHUTTER_SPEED: &str = "ShutterSpeedValue";
    pub const METERING_MODE: &str = "MeteringMode";
    pub const ISO_SPEED_RATINGS: &str = "ISOSpeedRatings";
    pub const F_NUMBER: &str = "FNumber";
    pub const APERTURE: &str = "ApertureValue";
    pub const MAX_APERTURE: &str = "MaxApertureValue";
    pub const FOCAL_LENGTH: &str = "FocalLength";
    pub const FOCAL_LENGTH_35MM: &str = "FocalLenIn35mmFilm";
    pub const WHITE_BALANCE: &str = "WhiteBalance";
    pub const SENSING_METHOD: &str = "SensingMethod";
    pub const SCENE_CAPTURE_TYPE: &str = "SceneCaptureType";
    pub const DIGITAL_ZOOM: &str = "DigitalZoomRatio";
    pub const SUBJECT_AREA: &str = "SubjectArea";
    pub const LIGHT_SOURCE: &str = "LightSource";
    pub const BRIGHTNESS: &str = "BrightnessValue";
    pub const CONTRAST: &str = "Contrast";
    pub const SATURATION: &str = "Saturation";
    pub const SHARPNESS: &str = "Sharpness";
    pub const FLASH: &str = "Flash";
    pub const COLOR_SPACE: &str = "ColorSpace";
    pub const GAIN_CONTROL: &str = "GainControl";
    pub const CUSTOM_RENDERED: &str = "CustomRendered";
    pub const FILE_SOURCE: &str = "FileSource";
    pub const COMPONENTS_CONFIGURATION: &str = "ComponentsConfiguration";
    pub const FLASHPIX_VERSION: &str = "FlashPixVersion";
    pub const EXIF_VERSION: &str = "ExifVersion";
    pub const LENS_MODEL: &str = "LensModel";
    pub const LENS_MAKE: &str = "LensMake";
    pub const LENS_SPECIFICATION: &str = "LensSpecification";
    pub const LENS_SERIAL_NUMBER: &str = "LensSerialNumber";
    pub const USER_COMMENT: &str = "UserComment";
    pub const MAKER_NOTE: &str = "MakerNote";
    pub const PIXEL_X_DIMENSION: &str = "PixelXDimension";
    pub const PIXEL_Y_DIMENSION: &str = "PixelYDimension";
}

pub mod tiff {
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const SOFTWARE: &str = "Software";
    pub const ORIENTATION: &str = "Orientation";
}

pub mod gps {
    pub const LATITUDE: &str = "Latitude";
    pub const LATITUDE_REF: &str = "LatitudeRef";
    pub const LONGITUDE: &str = "Longitude";
    pub const LONGITUDE_REF: &str = "LongitudeRef";
}

pub mod root {
    pub const COLOR_MODEL: &str = "ColorModel";
    pub const DEPTH: &str = "Depth";
    pub const PROFILE_NAME: &str = "ProfileName";
    pub const ORIENTATION: &str = "Orientation";
    pub const PIXEL_WIDTH: &str = "PixelWidth";
    pub const PIXEL_HEIGHT: &str = "PixelHeight";
}

/// IPTC fields surfaced for editing, in layout order.
pub const EDITABLE_IPTC_MAP: &[(&str, &str)] = &[
    (iptc::OBJECT_NAME, "Title"),
    (iptc::HEADLINE, "Headline"),
    (iptc::CAPTION, "Caption"),
    (iptc::KEYWORDS, "Keywords"),
    (iptc::CITY, "City"),
    (iptc::PROVINCE_STATE, "State"),
    (iptc::COUNTRY, "Country"),
    (iptc::BYLINE, "Author"),
    (iptc::COPYRIGHT_NOTICE, "Copyright"),
    (iptc::SOURCE, "Image Source"),
];

/// EXIF/TIFF fields surfaced for editing. Make, Model, and Software route
/// back to the TIFF group on save; everything else is EXIF.
pub const EDITABLE_EXIF_MAP: &[(&str, &str)] = &[
    (exif::FOCAL_LENGTH, "Focal Length"),
    (exif::FOCAL_LENGTH_35MM, "Focal Length (35mm)"),
    (exif::F_NUMBER, "F Number"),
    (exif::ISO_SPEED_RATINGS, "ISO Speed"),
    (exif::DIGITAL_ZOOM, "Digital Zoom"),
    (exif::EXPOSURE_BIAS, "Exposure Bias"),
    (exif::EXPOSURE_TIME, "Exposure Time"),
    (exif::LENS_MODEL, "Lens Model"),
    (exif::LENS_MAKE, "Lens Make"),
    (exif::LENS_SERIAL_NUMBER, "Lens Serial Number"),
    (tiff::MAKE, "Camera Make"),
    (tiff::MODEL, "Camera Model"),
    (tiff::SOFTWARE, "Software"),
    (exif::USER_COMMENT, "User Comment"),
];

/// Restricted subset shown by the Essentials filter; a filtered view over
/// the IPTC field array, not a separate projection.
pub const ESSENTIALS_KEYS: &[&str] = &[iptc::OBJECT_NAME, iptc::KEYWORDS, iptc::CAPTION];

/// Editable EXIF-group keys that live in the TIFF group on disk.
pub const TIFF_ROUTED_KEYS: &[&str] = &[tiff::MAKE, tiff::MODEL, tiff::SOFTWARE];

// Inspector section maps.

pub const EXIF_TIMESTAMP_MAP: &[(&str, &str)] = &[
    (exif::DATE_TIME_ORIGINAL, "Date Taken"),
    (exif::DATE_TIME_DIGITIZED, "Date Modified"),
];

pub const EXIF_CAMERA_SETTINGS_MAP: &[(&str, &str)] = &[
    (exif::EXPOSURE_PROGRAM, "Exposure Program"),
    (exif::EXPOSURE_MODE, "Exposure Mode"),
    (exif::EXPOSURE_BIAS, "Exposure Bias"),
    (exif::EXPOSURE_TIME, "Exposure Time"),
    (exif::SHUTTER_SPEED, "Shutter Speed Value"),
    (exif::METERING_MODE, "Metering Mode"),
    (exif::ISO_SPEED_RATINGS, "ISO"),
    (exif::F_NUMBER, "F Number"),
    (exif::APERTURE, "Aperture (APEX)"),
    (exif::MAX_APERTURE, "Max Aperture (APEX)"),
    (exif::FOCAL_LENGTH, "Focal Length"),
    (exif::FOCAL_LENGTH_35MM, "Focal Length (35mm)"),
    (exif::WHITE_BALANCE, "White Balance"),
    (exif::SENSING_METHOD, "Sensing Method"),
    (exif::SCENE_CAPTURE_TYPE, "Scene Capture Type"),
    (exif::DIGITAL_ZOOM, "Digital Zoom"),
    (exif::SUBJECT_AREA, "Subject Area"),
    (exif::LIGHT_SOURCE, "Light Source"),
];

pub const EXIF_IMAGE_QUALITY_MAP: &[(&str, &str)] = &[
    (exif::BRIGHTNESS, "Brightness"),
    (exif::CONTRAST, "Contrast"),
    (exif::SATURATION, "Saturation"),
    (exif::SHARPNESS, "Sharpness"),
    (exif::FLASH, "Flash"),
];

pub const EXIF_IMAGE_SETTINGS_MAP: &[(&str, &str)] = &[
    (exif::COLOR_SPACE, "Color Space"),
    (exif::GAIN_CONTROL, "Gain Control"),
    (exif::CUSTOM_RENDERED, "Custom Rendering"),
    (exif::FILE_SOURCE, "File Source"),
    (exif::COMPONENTS_CONFIGURATION, "Components Configuration"),
    (exif::FLASHPIX_VERSION, "FlashPix Version"),
    (exif::EXIF_VERSION, "EXIF Version"),
];

pub const EXIF_LENS_INFO_MAP: &[(&str, &str)] = &[
    (exif::LENS_MODEL, "Lens Model"),
    (exif::LENS_MAKE, "Lens Make"),
    (exif::LENS_SPECIFICATION, "Lens Specification"),
    (exif::LENS_SERIAL_NUMBER, "Lens Serial Number"),
];

pub const TIFF_CAMERA_INFO_MAP: &[(&str, &str)] = &[
    (tiff::MAKE, "Camera Make"),
    (tiff::MODEL, "Camera Model"),
    (tiff::SOFTWARE, "Software"),
];

pub const EXIF_CAMERA_NOTES_MAP: &[(&str, &str)] = &[
    (exif::USER_COMMENT, "User Comment"),
    (exif::MAKER_NOTE, "Maker Notes"),
];

pub const GPS_MAP: &[(&str, &str)] = &[
    (gps::LATITUDE, "Latitude"),
    (gps::LATITUDE_REF, "Latitude Ref"),
    (gps::LONGITUDE, "Longitude"),
    (gps::LONGITUDE_REF, "Longitude Ref"),
];

pub const GENERAL_MAP: &[(&str, &str)] = &[
    (root::COLOR_MODEL, "Color Model"),
    (root::DEPTH, "Bit Depth"),
    (root::PROFILE_NAME, "Color Profile"),
    (root::ORIENTATION, "Orientation"),
];

/// Encode a signed coordinate as the GPS tag group: absolute values plus
/// N/S and E/W reference letters.
pub fn gps_group(coordinate: Coordinate) -> BTreeMap<String, TagValue> {
    let mut group = BTreeMap::new();
    group.insert(
        gps::LATITUDE.to_string(),
        TagValue::Number(coordinate.latitude.abs()),
    );
    group.insert(
        gps::LATITUDE_REF.to_string(),
        TagValue::from(if coordinate.latitude >= 0.0 { "N" } else { "S" }),
    );
    group.insert(
        gps::LONGITUDE.to_string(),
        TagValue::Number(coordinate.longitude.abs()),
    );
    group.insert(
        gps::LONGITUDE_REF.to_string(),
        TagValue::from(if coordinate.longitude >= 0.0 { "E" } else { "W" }),
    );
    group
}

/// Decode the GPS quadruple back to a signed coordinate. Requires all four
/// parts present and well-typed; anything else reads as "no location".
pub fn parse_gps_group(group: &BTreeMap<String, TagValue>) -> Option<Coordinate> {
    let lat = group.get(gps::LATITUDE)?.as_f64()?;
    let lat_ref = group.get(gps::LATITUDE_REF)?.as_str()?;
    let lon = group.get(gps::LONGITUDE)?.as_f64()?;
    let lon_ref = group.get(gps::LONGITUDE_REF)?.as_str()?;

    let latitude = if lat_ref == "S" { -lat } else { lat };
    let longitude = if lon_ref == "W" { -lon } else { lon };
    Some(Coordinate::new(latitude, longitude))
}

/// Per-field help text shown alongside the edit form.
pub fn field_help(label: &str) -> &'static str {
    match label {
        "Title" => "A short verbal and human readable name for the image; may be the file name.",
        "Headline" => "A brief publishable synopsis or summary of the contents of the image.",
        "Caption" => "A caption describing the who, what, and why of what is happening in this image.",
        "Keywords" => "Any number of keywords, terms or phrases expressing the subject of the image.",
        "City" => "The name of the city pictured in this image.",
        "State" => "The name of the province or state pictured in this image.",
        "Country" => "The name of the country pictured in this image.",
        "Author" => "The name of the person that created this image.",
        "Copyright" => "A notice on the current owner of the copyright for this image.",
        "Image Source" => "The original owner of the rights to this image.",
        "Focal Length" => "Focal length of the lens used to take the image, in millimeters.",
        "Focal Length (35mm)" => "Focal length assuming a 35mm film camera.",
        "F Number" => "The actual F-number (F-stop) of the lens when the image was taken.",
        "ISO Speed" => "Sensor sensitivity equivalent to film speed rate.",
        "Digital Zoom" => "Digital zoom ratio. 0 = none, 2 = digital 2x zoom.",
        "Exposure Bias" => "Exposure bias applied when taking the picture, in EV.",
        "Exposure Time" => "Exposure time (reciprocal of shutter speed), in seconds.",
        "Lens Model" => "Model number of the camera lens.",
        "Lens Make" => "Manufacturer of the camera lens.",
        "Lens Serial Number" => "Serial number of the camera lens.",
        "Camera Make" => "Manufacturer of the camera.",
        "Camera Model" => "Model number of the camera.",
        "Software" => "Firmware or software that produced the image.",
        "User Comment" => "Free-form user comment.",
        _ => "No description available for this tag.",
    }
}

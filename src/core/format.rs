//! Pure, total formatting of raw tag values into display strings, plus the
//! constrained inverse helpers (dates, comma-separated lists). Unknown or
//! malformed input degrades to a readable fallback, never an error.

use chrono::NaiveDateTime;

use crate::models::TagValue;

use super::keys::{exif, iptc, root};

fn exposure_program(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Not Defined",
        1 => "Manual",
        2 => "Normal Program",
        3 => "Aperture Priority",
        4 => "Shutter Priority",
        5 => "Creative Program",
        6 => "Action Program",
        7 => "Portrait Mode",
        8 => "Landscape Mode",
        _ => return None,
    })
}

fn exposure_mode(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Auto Exposure",
        1 => "Manual",
        2 => "Auto Bracket",
        _ => return None,
    })
}

fn white_balance(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Auto",
        1 => "Manual",
        _ => return None,
    })
}

fn metering_mode(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Unknown",
        1 => "Average",
        2 => "Center Weighted Average",
        3 => "Spot",
        4 => "Multi-spot",
        5 => "Multi-segment",
        6 => "Partial",
        255 => "Other",
        _ => return None,
    })
}

fn sensing_method(code: i64) -> Option<&'static str> {
    Some(match code {
        1 => "Not Defined",
        2 => "One-chip Color Area Sensor",
        3 => "Two-chip Color Area Sensor",
        4 => "Three-chip Color Area Sensor",
        5 => "Color Sequential Area Sensor",
        7 => "Trilinear Sensor",
        8 => "Other",
        _ => return None,
    })
}

fn scene_capture_type(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Standard",
        1 => "Landscape",
        2 => "Portrait",
        3 => "Night Scene",
        _ => return None,
    })
}

fn light_source(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Unknown",
        1 => "Daylight",
        2 => "Fluorescent",
        3 => "Tungsten",
        4 => "Flash",
        9 => "Fine Weather",
        10 => "Cloudy",
        11 => "Shade",
        12 => "Daylight Fluorescent",
        13 => "Day White Fluorescent",
        14 => "Cool White Fluorescent",
        15 => "White Fluorescent",
        17 => "Standard Light A",
        18 => "Standard Light B",
        19 => "Standard Light C",
        20 => "D55",
        21 => "D65",
        22 => "D75",
        23 => "D50",
        24 => "ISO Studio Tungsten",
        255 => "Other",
        _ => return None,
    })
}

fn flash(code: i64) -> Option<&'static str> {
    Some(match code {
        0x0 => "Flash did not fire",
        0x1 => "Flash fired",
        0x5 => "Flash fired, no return",
        0x7 => "Flash fired, return detected",
        0x9 => "Compulsory flash fired",
        0xD => "Compulsory flash, no return",
        0xF => "Compulsory flash, return detected",
        0x10 => "Flash not fired (compulsory)",
        0x18 => "Auto, flash not fired",
        0x19 => "Auto, flash fired",
        0x1D => "Auto, no return",
        0x1F => "Auto, return detected",
        0x20 => "No flash function",
        0x41 => "Red-eye, flash fired",
        0x45 => "Red-eye, no return",
        0x47 => "Red-eye, return detected",
        _ => return None,
    })
}

fn color_space(code: i64) -> Option<&'static str> {
    Some(match code {
        1 => "sRGB",
        65535 => "Uncalibrated",
        _ => return None,
    })
}

fn gain_control(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "None",
        1 => "Low Gain Up",
        2 => "High Gain Up",
        3 => "Low Gain Down",
        4 => "High Gain Down",
        _ => return None,
    })
}

fn custom_rendered(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Normal",
        1 => "Custom",
        _ => return None,
    })
}

fn file_source(code: i64) -> Option<&'static str> {
    Some(match code {
        1 => "Film Scanner",
        2 => "Reflection Print Scanner",
        3 => "Digital Camera",
        _ => return None,
    })
}

fn orientation(code: i64) -> Option<&'static str> {
    Some(match code {
        1 => "Top-left",
        2 => "Top-right",
        3 => "Bottom-right",
        4 => "Bottom-left",
        5 => "Left-top",
        6 => "Right-top",
        7 => "Right-bottom",
        8 => "Left-bottom",
        _ => return None,
    })
}

fn lookup_for(key: &str) -> Option<fn(i64) -> Option<&'static str>> {
    Some(match key {
        exif::EXPOSURE_PROGRAM => exposure_program,
        exif::EXPOSURE_MODE => exposure_mode,
        exif::WHITE_BALANCE => white_balance,
        exif::METERING_MODE => metering_mode,
        exif::SENSING_METHOD => sensing_method,
        exif::SCENE_CAPTURE_TYPE => scene_capture_type,
        exif::LIGHT_SOURCE => light_source,
        exif::FLASH => flash,
        exif::COLOR_SPACE => color_space,
        exif::GAIN_CONTROL => gain_control,
        exif::CUSTOM_RENDERED => custom_rendered,
        exif::FILE_SOURCE => file_source,
        root::ORIENTATION => orientation,
        _ => return None,
    })
}

/// Generic rendering: lists join with `separator`, scalars stringify,
/// absent values render `-`.
pub fn format_value_with(value: Option<&TagValue>, separator: &str) -> String {
    match value {
        Some(raw) => raw.join(separator),
        None => String::from("-"),
    }
}

pub fn format_value(value: Option<&TagValue>) -> String {
    format_value_with(value, ", ")
}

/// Render an enumerated code through its fixed lookup table. Unknown codes
/// come out as `Unrecognized (<code>)`; non-numeric input and tags with no
/// table fall back to the generic rendering.
pub fn format_enumerated(key: &str, value: Option<&TagValue>) -> String {
    let Some(raw) = value else {
        return String::from("-");
    };

    match (lookup_for(key), raw.as_code()) {
        (Some(table), Some(code)) => table(code)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unrecognized ({code})")),
        _ => format_value(value),
    }
}

fn format_seconds(seconds: f64) -> Option<String> {
    if seconds <= 0.0 || !seconds.is_finite() {
        return None;
    }
    if seconds >= 1.0 {
        Some(format!("{seconds:.1}s"))
    } else {
        Some(format!("1/{}s", (1.0 / seconds).round() as i64))
    }
}

fn format_version(value: &TagValue) -> Option<String> {
    let items = value.as_list()?;
    if items.len() < 2 {
        return None;
    }
    let parts: Vec<String> = items
        .iter()
        .take(2)
        .map(|item| item.to_string())
        .collect();
    Some(parts.join("."))
}

/// Tag-specific numeric rendering (exposure bias, shutter speeds, f-number,
/// focal lengths, version arrays). Anything non-finite or non-numeric falls
/// back to the generic rendering.
pub fn format_numeric(key: &str, value: Option<&TagValue>) -> String {
    let Some(raw) = value else {
        return String::from("-");
    };

    let formatted = match key {
        exif::EXPOSURE_BIAS => raw
            .as_f64()
            .filter(|ev| ev.is_finite())
            .map(|ev| format!("{ev:.1} EV")),
        exif::EXPOSURE_TIME => raw.as_f64().and_then(format_seconds),
        exif::SHUTTER_SPEED => raw
            .as_f64()
            .filter(|apex| apex.is_finite())
            .and_then(|apex| format_seconds(2f64.powf(-apex))),
        exif::F_NUMBER => raw
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| format!("f/{f:.1}")),
        exif::FOCAL_LENGTH => raw
            .as_f64()
            .filter(|mm| mm.is_finite())
            .map(|mm| format!("{mm:.0} mm")),
        exif::FOCAL_LENGTH_35MM => raw
            .as_f64()
            .filter(|mm| mm.is_finite())
            .map(|mm| format!("{mm:.0} mm (35mm)")),
        exif::FLASHPIX_VERSION | exif::EXIF_VERSION => format_version(raw),
        _ => None,
    };

    formatted.unwrap_or_else(|| format_value(value))
}

/// Display formatting for the technical EXIF sections: enumerated tables
/// first, then the numeric rules, then the generic rendering.
pub fn format_technical(key: &str, value: Option<&TagValue>) -> String {
    if lookup_for(key).is_some() {
        return format_enumerated(key, value);
    }
    match key {
        exif::EXPOSURE_BIAS
        | exif::EXPOSURE_TIME
        | exif::SHUTTER_SPEED
        | exif::F_NUMBER
        | exif::FOCAL_LENGTH
        | exif::FOCAL_LENGTH_35MM
        | exif::FLASHPIX_VERSION
        | exif::EXIF_VERSION => format_numeric(key, value),
        _ => format_value(value),
    }
}

/// EXIF date strings (`yyyy:MM:dd HH:mm:ss`) render as
/// `yyyy/MM/dd, HH:mm:ss`; other keys pass the raw string through.
pub fn format_exif_date(key: &str, value: Option<&TagValue>) -> String {
    let Some(raw) = value.and_then(TagValue::as_str) else {
        return String::from("-");
    };

    if key == exif::DATE_TIME_ORIGINAL || key == exif::DATE_TIME_DIGITIZED {
        if let (Some(date_part), Some(time_part)) = (raw.get(..10), raw.get(11..)) {
            return format!("{}, {time_part}", date_part.replace(':', "/"));
        }
    }

    raw.to_string()
}

/// IPTC display formatting: multi-value fields join with `, `.
pub fn format_iptc(key: &str, value: Option<&TagValue>) -> String {
    match key {
        iptc::KEYWORDS | iptc::BYLINE => format_value_with(value, ", "),
        _ => format_value(value),
    }
}

/// Root-dictionary ("general") display formatting.
pub fn format_general(key: &str, value: Option<&TagValue>) -> String {
    if key == root::ORIENTATION {
        return format_enumerated(root::ORIENTATION, value);
    }
    format_value(value)
}

/// Inverse of the `, ` join for keyword/author-style fields: split, trim,
/// drop empties.
pub fn split_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

// Date parsing and rendering. EXIF datetimes and IPTC date/time pairs are
// naive wall-clock values; the IPTC pair is treated as UTC when resolving
// an initial date-taken.

pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
pub const IPTC_DATE_FORMAT: &str = "%Y%m%d";
pub const IPTC_TIME_FORMAT: &str = "%H%M%S";
pub const IPTC_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME_FORMAT).ok()
}

pub fn exif_datetime_string(date: NaiveDateTime) -> String {
    date.format(EXIF_DATETIME_FORMAT).to_string()
}

pub fn iptc_date_string(date: NaiveDateTime) -> String {
    date.format(IPTC_DATE_FORMAT).to_string()
}

pub fn iptc_time_string(date: NaiveDateTime) -> String {
    date.format(IPTC_TIME_FORMAT).to_string()
}

pub fn parse_iptc_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let combined = format!("{}{}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&combined, IPTC_DATETIME_FORMAT).ok()
}

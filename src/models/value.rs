use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One loosely-typed metadata value as found in an image's property
/// dictionary. Containers give us strings, numbers, arrays, and nested
/// dictionaries; consumers must never assume a key's type without a
/// guarded match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Number(f64),
    List(Vec<TagValue>),
    Map(BTreeMap<String, TagValue>),
}

impl TagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integral numeric code, used by the enumerated-tag lookup tables.
    pub fn as_code(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TagValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, TagValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Join list elements with `separator`; scalars stringify directly.
    pub fn join(&self, separator: &str) -> String {
        match self {
            Self::List(items) => items
                .iter()
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
                .join(separator),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::List(_) => write!(f, "{}", self.join(", ")),
            Self::Map(map) => {
                let encoded = serde_json::to_string(map).unwrap_or_default();
                write!(f, "{encoded}")
            }
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Self::Text).collect())
    }
}

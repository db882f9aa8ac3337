mod config;
mod dictionary;
mod field;
mod photo;
mod value;

pub use config::{CatalogConfig, MetadataFilter, SortOrder};
pub use dictionary::{TagDictionary, GROUP_EXIF, GROUP_GPS, GROUP_IPTC, GROUP_TIFF};
pub use field::{EditableField, FieldSet};
pub use photo::{record_id_for, Coordinate, LocationEdit, PhotoRecord, ThumbnailData};
pub use value::TagValue;

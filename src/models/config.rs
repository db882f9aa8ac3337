use serde::{Deserialize, Serialize};

/// Catalog ordering strategy. Each variant is a total order over photo
/// records, descending, with ties broken by input order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    RecentlyAdded,
    DateCaptured,
    DateModified,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            Self::RecentlyAdded => "Recently Added",
            Self::DateCaptured => "Date Captured",
            Self::DateModified => "Modified Date",
        }
    }
}

/// Which editable field groups an edit session surfaces. `Essentials` is
/// the restricted title/keywords/caption subset of the IPTC fields.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataFilter {
    #[default]
    All,
    Iptc,
    Exif,
    Essentials,
}

impl MetadataFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Tags",
            Self::Iptc => "IPTC",
            Self::Exif => "EXIF",
            Self::Essentials => "Essentials",
        }
    }
}

/// Explicit configuration threaded into the catalog and edit sessions.
/// Persisting it is the caller's concern, hence the serde derives.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub sort_order: SortOrder,
    pub default_filter: MetadataFilter,
    pub max_batch_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::default(),
            default_filter: MetadataFilter::default(),
            max_batch_size: 12,
        }
    }
}

//! Fixed endpoints, search parameters, and classification term sets.

pub const USASPENDING_BASE_URL: &str = "https://api.usaspending.gov/api/v2";
pub const MAPBOX_FORWARD_URL: &str = "https://api.mapbox.com/search/geocode/v6/forward";

/// The search is restricted to a fixed historical window.
pub const SEARCH_WINDOW_START: &str = "2015-01-01";
pub const SEARCH_WINDOW_END: &str = "2024-12-31";

/// Columns requested from the award search endpoint. The response keys
/// results by these display names.
pub const SEARCH_FIELDS: &[&str] = &[
    "Award ID",
    "Recipient Name",
    "Award Amount",
    "Description",
    "Place of Performance City Code",
    "Place of Performance State Code",
];

/// Description terms that mark an award as public-infrastructure work.
pub const DESCRIPTION_TERMS: &[&str] = &[
    "public",
    "visitor",
    "community",
    "facility",
    "building",
    "construction",
    "renovation",
    "park",
    "museum",
    "library",
];

/// Recipient-name fragments that mark a government or civic recipient.
pub const PUBLIC_RECIPIENT_TERMS: &[&str] = &[
    "city of",
    "county of",
    "state of",
    "university",
    "park service",
    "department",
    "commission",
];

//! Domain records for the collection pipeline.
//!
//! Wire payloads deserialize into these directly where the shapes line up
//! (`AwardSummary`), or through flattening structs in the API clients where
//! the upstream JSON is nested (`AwardDetail`). Optional upstream fields
//! stay `Option` here so missing data is a value, not a fault.

use serde::{Deserialize, Serialize};

/// Award-type buckets the search API requires querying separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardGroup {
    Contracts,
    Grants,
    Other,
}

impl AwardGroup {
    pub fn type_codes(&self) -> &'static [&'static str] {
        match self {
            AwardGroup::Contracts => &["A", "B", "C", "D"],
            AwardGroup::Grants => &["02", "03", "04", "05"],
            AwardGroup::Other => &["06", "10"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AwardGroup::Contracts => "contracts",
            AwardGroup::Grants => "grants",
            AwardGroup::Other => "other",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "contracts" => Some(AwardGroup::Contracts),
            "grants" => Some(AwardGroup::Grants),
            "other" => Some(AwardGroup::Other),
            _ => None,
        }
    }
}

/// One row of the award search response, keyed by the requested field names.
/// Ephemeral: read for filtering and the detail-fetch id, then discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct AwardSummary {
    /// Internal id the detail endpoint is keyed by. Always present in
    /// practice, but the pipeline skips the award rather than fail if not.
    #[serde(default)]
    pub generated_internal_id: Option<String>,
    #[serde(default, rename = "Award ID")]
    pub award_id: Option<String>,
    #[serde(default, rename = "Recipient Name")]
    pub recipient_name: Option<String>,
    #[serde(default, rename = "Description")]
    pub description: Option<String>,
    #[serde(default, rename = "Award Amount")]
    pub award_amount: Option<f64>,
    #[serde(default, rename = "Place of Performance City Code")]
    pub place_city_code: Option<String>,
    #[serde(default, rename = "Place of Performance State Code")]
    pub place_state_code: Option<String>,
}

/// Full award record, flattened from the nested detail payload.
#[derive(Debug, Clone, Default)]
pub struct AwardDetail {
    pub source_id: Option<i64>,
    pub description: Option<String>,
    pub awarding_agency_name: Option<String>,
    pub recipient_name: Option<String>,
    pub total_obligation: Option<f64>,
    pub fiscal_year: Option<i64>,
    pub place_of_performance: PlaceOfPerformance,
}

/// Where the awarded work happens. Empty upstream strings are normalized
/// to `None` at parse time, so `is_some()` means a usable value.
#[derive(Debug, Clone, Default)]
pub struct PlaceOfPerformance {
    pub address_line: Option<String>,
    pub city_name: Option<String>,
    pub state_code: Option<String>,
    pub zip5: Option<String>,
}

/// A resolved latitude/longitude pair. Geocoding either yields both or
/// nothing; there is no partial coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// The normalized output unit, shaped for the downstream database loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub source_id: Option<i64>,
    pub title: String,
    pub agency: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<f64>,
    pub fiscal_year: Option<i64>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    /// Reserved for a future classification pass.
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ProjectRecord {
    /// Only fully geocoded records survive into the final output set.
    pub fn has_coordinate(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_group_codes() {
        assert_eq!(AwardGroup::Contracts.type_codes(), &["A", "B", "C", "D"]);
        assert_eq!(AwardGroup::Grants.type_codes(), &["02", "03", "04", "05"]);
        assert_eq!(AwardGroup::Other.type_codes(), &["06", "10"]);
    }

    #[test]
    fn award_group_parse() {
        assert_eq!(AwardGroup::parse("grants"), Some(AwardGroup::Grants));
        assert_eq!(AwardGroup::parse("subsidies"), None);
    }

    #[test]
    fn award_summary_tolerates_missing_fields() {
        let summary: AwardSummary = serde_json::from_str("{}").unwrap();
        assert!(summary.generated_internal_id.is_none());
        assert!(summary.description.is_none());
    }

    #[test]
    fn award_summary_reads_display_keyed_fields() {
        let summary: AwardSummary = serde_json::from_value(serde_json::json!({
            "generated_internal_id": "CONT_AWD_1",
            "Award ID": "W912DY15C0001",
            "Recipient Name": "City of Tacoma",
            "Award Amount": 1_250_000.0,
            "Description": "MUSEUM RENOVATION",
        }))
        .unwrap();
        assert_eq!(summary.generated_internal_id.as_deref(), Some("CONT_AWD_1"));
        assert_eq!(summary.recipient_name.as_deref(), Some("City of Tacoma"));
        assert_eq!(summary.award_amount, Some(1_250_000.0));
    }
}

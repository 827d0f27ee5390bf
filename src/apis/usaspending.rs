//! Client for the USASpending v2 API: keyword award search plus per-award
//! detail fetch.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{send_with_retry, SpendingApi};
use crate::config::UsaSpendingConfig;
use crate::constants::{SEARCH_FIELDS, SEARCH_WINDOW_END, SEARCH_WINDOW_START};
use crate::error::Result;
use crate::pipeline::rate_limiter::RateLimiter;
use crate::types::{AwardDetail, AwardGroup, AwardSummary, PlaceOfPerformance};

pub struct UsaSpendingClient {
    client: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl UsaSpendingClient {
    pub fn new(config: &UsaSpendingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(config.requests_per_min),
        })
    }
}

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    filters: SearchFilters<'a>,
    fields: &'static [&'static str],
    limit: usize,
    page: u32,
    sort: &'static str,
    order: &'static str,
}

#[derive(Debug, Serialize)]
struct SearchFilters<'a> {
    keywords: [&'a str; 1],
    award_type_codes: &'static [&'static str],
    time_period: [TimePeriod; 1],
}

#[derive(Debug, Serialize)]
struct TimePeriod {
    start_date: &'static str,
    end_date: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<AwardSummary>,
}

/// Nested wire shape of the award detail endpoint. Flattened into
/// [`AwardDetail`] before it leaves this module.
#[derive(Debug, Default, Deserialize)]
struct AwardDetailPayload {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    awarding_agency: Option<AgencyPayload>,
    #[serde(default)]
    recipient: Option<RecipientPayload>,
    #[serde(default)]
    total_obligation: Option<f64>,
    #[serde(default)]
    fiscal_year: Option<i64>,
    #[serde(default)]
    place_of_performance: Option<PlacePayload>,
}

#[derive(Debug, Default, Deserialize)]
struct AgencyPayload {
    #[serde(default)]
    toptier_agency: Option<ToptierAgencyPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct ToptierAgencyPayload {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RecipientPayload {
    #[serde(default)]
    recipient_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PlacePayload {
    #[serde(default)]
    address_line1: Option<String>,
    #[serde(default)]
    city_name: Option<String>,
    #[serde(default)]
    state_code: Option<String>,
    #[serde(default)]
    zip5: Option<String>,
}

/// Upstream sends empty strings for fields it has no value for; collapse
/// them so downstream `is_some()` checks mean "usable".
fn clean(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AwardDetailPayload {
    fn into_detail(self) -> AwardDetail {
        let place = self.place_of_performance.unwrap_or_default();
        AwardDetail {
            source_id: self.id,
            description: clean(self.description),
            awarding_agency_name: clean(
                self.awarding_agency
                    .and_then(|a| a.toptier_agency)
                    .and_then(|t| t.name),
            ),
            recipient_name: clean(self.recipient.and_then(|r| r.recipient_name)),
            total_obligation: self.total_obligation,
            fiscal_year: self.fiscal_year,
            place_of_performance: PlaceOfPerformance {
                address_line: clean(place.address_line1),
                city_name: clean(place.city_name),
                state_code: clean(place.state_code),
                zip5: clean(place.zip5),
            },
        }
    }
}

#[async_trait]
impl SpendingApi for UsaSpendingClient {
    #[instrument(skip(self))]
    async fn search_awards(
        &self,
        keyword: &str,
        group: AwardGroup,
        limit: usize,
    ) -> Result<Vec<AwardSummary>> {
        self.limiter.acquire().await;

        let url = format!("{}/search/spending_by_award/", self.base_url);
        let payload = SearchPayload {
            filters: SearchFilters {
                keywords: [keyword],
                award_type_codes: group.type_codes(),
                time_period: [TimePeriod {
                    start_date: SEARCH_WINDOW_START,
                    end_date: SEARCH_WINDOW_END,
                }],
            },
            fields: SEARCH_FIELDS,
            limit,
            page: 1,
            sort: "Award Amount",
            order: "desc",
        };

        let Some(response) =
            send_with_retry("usaspending", || self.client.post(&url).json(&payload)).await
        else {
            return Ok(Vec::new());
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                group = group.label(),
                body = %body,
                "award search returned non-200, treating as empty"
            );
            return Ok(Vec::new());
        }

        let parsed: SearchResponse = response.json().await?;
        debug!(
            count = parsed.results.len(),
            group = group.label(),
            "award search results"
        );
        Ok(parsed.results)
    }

    #[instrument(skip(self))]
    async fn award_details(&self, award_id: &str) -> Result<Option<AwardDetail>> {
        self.limiter.acquire().await;

        let url = format!("{}/awards/{}/", self.base_url, award_id);
        let Some(response) = send_with_retry("usaspending", || self.client.get(&url)).await else {
            return Ok(None);
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(
                award_id,
                status = status.as_u16(),
                "award detail returned non-200, skipping"
            );
            return Ok(None);
        }

        let payload: AwardDetailPayload = response.json().await?;
        Ok(Some(payload.into_detail()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_payload_matches_wire_format() {
        let payload = SearchPayload {
            filters: SearchFilters {
                keywords: ["museum"],
                award_type_codes: AwardGroup::Grants.type_codes(),
                time_period: [TimePeriod {
                    start_date: SEARCH_WINDOW_START,
                    end_date: SEARCH_WINDOW_END,
                }],
            },
            fields: SEARCH_FIELDS,
            limit: 25,
            page: 1,
            sort: "Award Amount",
            order: "desc",
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["filters"]["keywords"], serde_json::json!(["museum"]));
        assert_eq!(
            value["filters"]["award_type_codes"],
            serde_json::json!(["02", "03", "04", "05"])
        );
        assert_eq!(
            value["filters"]["time_period"][0]["start_date"],
            "2015-01-01"
        );
        assert_eq!(value["sort"], "Award Amount");
        assert_eq!(value["order"], "desc");
        assert_eq!(value["page"], 1);
        assert_eq!(value["limit"], 25);
    }

    #[test]
    fn detail_payload_flattens_nested_objects() {
        let payload: AwardDetailPayload = serde_json::from_value(serde_json::json!({
            "id": 4217,
            "description": "VISITOR CENTER CONSTRUCTION",
            "awarding_agency": {"toptier_agency": {"name": "Department of the Interior"}},
            "recipient": {"recipient_name": "City of Boise"},
            "total_obligation": 2_400_000.5,
            "fiscal_year": 2021,
            "place_of_performance": {
                "address_line1": "100 Main St",
                "city_name": "Boise",
                "state_code": "ID",
                "zip5": "83702"
            }
        }))
        .unwrap();

        let detail = payload.into_detail();
        assert_eq!(detail.source_id, Some(4217));
        assert_eq!(
            detail.awarding_agency_name.as_deref(),
            Some("Department of the Interior")
        );
        assert_eq!(detail.recipient_name.as_deref(), Some("City of Boise"));
        assert_eq!(detail.place_of_performance.zip5.as_deref(), Some("83702"));
    }

    #[test]
    fn detail_payload_tolerates_sparse_records() {
        let payload: AwardDetailPayload =
            serde_json::from_value(serde_json::json!({"id": 9, "place_of_performance": null}))
                .unwrap();
        let detail = payload.into_detail();
        assert_eq!(detail.source_id, Some(9));
        assert!(detail.description.is_none());
        assert!(detail.place_of_performance.city_name.is_none());
    }

    #[test]
    fn empty_strings_collapse_to_none() {
        let payload: AwardDetailPayload = serde_json::from_value(serde_json::json!({
            "description": "  ",
            "place_of_performance": {"address_line1": "", "city_name": "Salem", "state_code": "OR"}
        }))
        .unwrap();
        let detail = payload.into_detail();
        assert!(detail.description.is_none());
        assert!(detail.place_of_performance.address_line.is_none());
        assert_eq!(detail.place_of_performance.city_name.as_deref(), Some("Salem"));
    }
}

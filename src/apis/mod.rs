//! Clients for the two upstream services, and the port traits the pipeline
//! depends on so tests can substitute in-memory doubles.

pub mod mapbox;
pub mod usaspending;

use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, warn};

use crate::error::Result;
use crate::types::{AwardDetail, AwardGroup, AwardSummary, GeoCoordinate};

/// Search and detail-fetch seam for the spending API.
#[async_trait]
pub trait SpendingApi: Send + Sync {
    /// One search call for one award group. Non-200 responses come back as
    /// an empty list, not an error.
    async fn search_awards(
        &self,
        keyword: &str,
        group: AwardGroup,
        limit: usize,
    ) -> Result<Vec<AwardSummary>>;

    /// Full record for one award. `None` on any non-200 status so the
    /// caller can skip the award without aborting the run.
    async fn award_details(&self, award_id: &str) -> Result<Option<AwardDetail>>;

    /// The search API forbids mixing award-type groups in one call, so the
    /// composite search queries contracts then grants and concatenates the
    /// results un-deduplicated.
    async fn search_all_award_types(
        &self,
        keyword: &str,
        limit_per_group: usize,
    ) -> Result<Vec<AwardSummary>> {
        let mut all_awards = Vec::new();
        for group in [AwardGroup::Contracts, AwardGroup::Grants] {
            let awards = self.search_awards(keyword, group, limit_per_group).await?;
            all_awards.extend(awards);
        }
        Ok(all_awards)
    }
}

/// Forward-geocoding seam. Total: every failure mode maps to `None`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(
        &self,
        address: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        zip: Option<&str>,
    ) -> Option<GeoCoordinate>;
}

const MAX_ATTEMPTS: u32 = 5;
const RETRY_BASE: Duration = Duration::from_secs(1);
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Issue a request up to `MAX_ATTEMPTS` times, backing off exponentially
/// (1s, 2s, 4s, 8s) on connect failures and the usual transient statuses.
/// `None` means every attempt failed at the transport level; the final
/// response is returned otherwise, retryable status or not, for the caller
/// to treat as a plain non-200.
pub(crate) async fn send_with_retry<F>(service: &str, make_request: F) -> Option<reqwest::Response>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    for attempt in 0..MAX_ATTEMPTS {
        let backoff = RETRY_BASE * 2u32.pow(attempt);
        match make_request().send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if RETRYABLE_STATUSES.contains(&status) && attempt + 1 < MAX_ATTEMPTS {
                    warn!(
                        service,
                        status,
                        attempt = attempt + 1,
                        backoff_secs = backoff.as_secs(),
                        "transient status, retrying after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
                return Some(response);
            }
            Err(e) => {
                if attempt + 1 < MAX_ATTEMPTS {
                    warn!(
                        service,
                        attempt = attempt + 1,
                        backoff_secs = backoff.as_secs(),
                        error = %e,
                        "request failed, retrying after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
                error!(service, error = %e, "request failed after retries, giving up");
            }
        }
    }
    None
}

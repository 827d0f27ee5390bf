//! Drives the keyword loop: composite search, optional relevance gate,
//! detail fetch, normalize/geocode, aggregate.

use tracing::{debug, info, warn};

use crate::apis::{Geocoder, SpendingApi};
use crate::config::CollectorConfig;
use crate::error::Result;
use crate::pipeline::filter::is_public_interest;
use crate::pipeline::normalize::prepare_project;
use crate::types::ProjectRecord;

#[derive(Debug, Default)]
pub struct CollectionStats {
    pub keywords_processed: usize,
    pub awards_processed: usize,
    pub details_missing: usize,
    pub geocode_failures: usize,
}

pub struct CollectionResult {
    pub projects: Vec<ProjectRecord>,
    pub stats: CollectionStats,
}

pub struct Collector<'a> {
    spending: &'a dyn SpendingApi,
    geocoder: &'a dyn Geocoder,
    options: CollectorConfig,
}

impl<'a> Collector<'a> {
    pub fn new(
        spending: &'a dyn SpendingApi,
        geocoder: &'a dyn Geocoder,
        options: CollectorConfig,
    ) -> Self {
        Self {
            spending,
            geocoder,
            options,
        }
    }

    /// Run the whole pipeline across every configured keyword and return
    /// the aggregated, fully geocoded records.
    pub async fn collect(&self) -> Result<CollectionResult> {
        let mut projects = Vec::new();
        let mut stats = CollectionStats::default();
        let per_keyword = self.options.projects_per_keyword;

        for keyword in &self.options.keywords {
            info!(keyword = %keyword, "processing keyword");

            let mut awards = self
                .spending
                .search_all_award_types(keyword, per_keyword)
                .await?;
            info!(keyword = %keyword, found = awards.len(), "search complete");

            if self.options.apply_relevance_filter {
                let before = awards.len();
                awards.retain(is_public_interest);
                debug!(before, after = awards.len(), "relevance filter applied");
            }

            // Top N of the concatenated lists; one heavy group can crowd
            // out the other here.
            for award in awards.into_iter().take(per_keyword) {
                stats.awards_processed += 1;

                let Some(award_id) = award.generated_internal_id.as_deref() else {
                    warn!("search result has no internal id, skipping");
                    stats.details_missing += 1;
                    continue;
                };

                let Some(detail) = self.spending.award_details(award_id).await? else {
                    warn!(award_id, "no detail record, skipping");
                    stats.details_missing += 1;
                    continue;
                };

                let project = prepare_project(&detail, self.geocoder).await;
                if project.has_coordinate() {
                    info!(
                        title = %preview(&project.title),
                        latitude = project.latitude,
                        longitude = project.longitude,
                        "project kept"
                    );
                    projects.push(project);
                } else {
                    info!(title = %preview(&project.title), "could not geocode, dropped");
                    stats.geocode_failures += 1;
                }
            }

            stats.keywords_processed += 1;
            info!(keyword = %keyword, total_kept = projects.len(), "keyword complete");
        }

        Ok(CollectionResult { projects, stats })
    }
}

fn preview(title: &str) -> String {
    title.chars().take(50).collect()
}

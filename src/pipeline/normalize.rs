//! Maps one award detail (plus an optional geocode) into the flat record
//! the downstream loader expects.

use tracing::debug;

use crate::apis::Geocoder;
use crate::types::{AwardDetail, ProjectRecord};

pub const TITLE_MAX_CHARS: usize = 255;

fn truncate_title(description: Option<&str>) -> String {
    match description {
        Some(text) if !text.is_empty() => text.chars().take(TITLE_MAX_CHARS).collect(),
        _ => "N/A".to_string(),
    }
}

/// Build a [`ProjectRecord`] from an award detail, geocoding the place of
/// performance when enough location fields exist. A failed or skipped
/// geocode leaves the coordinates unset; the aggregation step drops such
/// records.
pub async fn prepare_project(detail: &AwardDetail, geocoder: &dyn Geocoder) -> ProjectRecord {
    let location = &detail.place_of_performance;
    debug!(
        address = ?location.address_line,
        city = ?location.city_name,
        state = ?location.state_code,
        "extracting place of performance"
    );

    let mut project = ProjectRecord {
        source_id: detail.source_id,
        title: truncate_title(detail.description.as_deref()),
        agency: detail.awarding_agency_name.clone(),
        recipient: detail.recipient_name.clone(),
        amount: detail.total_obligation,
        fiscal_year: detail.fiscal_year,
        description: detail.description.clone(),
        city: location.city_name.clone(),
        state: location.state_code.clone(),
        address: location.address_line.clone(),
        zip_code: location.zip5.clone(),
        category: None, // categorized later
        latitude: None,
        longitude: None,
    };

    // An address alone is enough to try; otherwise the full
    // city+state+zip triple is required before spending a geocoding call.
    let should_geocode = project.address.is_some()
        || (project.city.is_some() && project.state.is_some() && project.zip_code.is_some());

    if should_geocode {
        if let Some(coordinate) = geocoder
            .geocode(
                project.address.as_deref(),
                project.city.as_deref(),
                project.state.as_deref(),
                project.zip_code.as_deref(),
            )
            .await
        {
            debug!(
                latitude = coordinate.latitude,
                longitude = coordinate.longitude,
                "geocoded"
            );
            project.latitude = Some(coordinate.latitude);
            project.longitude = Some(coordinate.longitude);
        } else {
            debug!("geocoding produced no coordinate");
        }
    } else {
        debug!("insufficient location fields, skipping geocoding");
    }

    project
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeoCoordinate, PlaceOfPerformance};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and always resolves to a fixed coordinate.
    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    impl CountingGeocoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn geocode(
            &self,
            _address: Option<&str>,
            _city: Option<&str>,
            _state: Option<&str>,
            _zip: Option<&str>,
        ) -> Option<GeoCoordinate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(GeoCoordinate {
                latitude: 47.6062,
                longitude: -122.3321,
            })
        }
    }

    fn detail_with_place(place: PlaceOfPerformance) -> AwardDetail {
        AwardDetail {
            source_id: Some(77),
            description: Some("COMMUNITY CENTER ROOF REPLACEMENT".to_string()),
            awarding_agency_name: Some("General Services Administration".to_string()),
            recipient_name: Some("City of Olympia".to_string()),
            total_obligation: Some(640_000.0),
            fiscal_year: Some(2019),
            place_of_performance: place,
        }
    }

    #[tokio::test]
    async fn title_truncates_to_255_chars() {
        let geocoder = CountingGeocoder::new();
        let mut detail = detail_with_place(PlaceOfPerformance::default());
        detail.description = Some("x".repeat(300));

        let project = prepare_project(&detail, &geocoder).await;
        assert_eq!(project.title.chars().count(), 255);
        assert_eq!(project.description.as_deref().map(str::len), Some(300));
    }

    #[tokio::test]
    async fn missing_description_becomes_placeholder() {
        let geocoder = CountingGeocoder::new();
        let mut detail = detail_with_place(PlaceOfPerformance::default());
        detail.description = None;

        let project = prepare_project(&detail, &geocoder).await;
        assert_eq!(project.title, "N/A");
    }

    #[tokio::test]
    async fn address_alone_triggers_geocoding() {
        let geocoder = CountingGeocoder::new();
        let detail = detail_with_place(PlaceOfPerformance {
            address_line: Some("500 Capitol Way".to_string()),
            ..Default::default()
        });

        let project = prepare_project(&detail, &geocoder).await;
        assert_eq!(geocoder.call_count(), 1);
        assert_eq!(project.latitude, Some(47.6062));
        assert_eq!(project.longitude, Some(-122.3321));
    }

    #[tokio::test]
    async fn city_state_without_zip_skips_geocoding() {
        let geocoder = CountingGeocoder::new();
        let detail = detail_with_place(PlaceOfPerformance {
            city_name: Some("Olympia".to_string()),
            state_code: Some("WA".to_string()),
            ..Default::default()
        });

        let project = prepare_project(&detail, &geocoder).await;
        assert_eq!(geocoder.call_count(), 0);
        assert!(!project.has_coordinate());
    }

    #[tokio::test]
    async fn full_city_state_zip_triggers_geocoding() {
        let geocoder = CountingGeocoder::new();
        let detail = detail_with_place(PlaceOfPerformance {
            city_name: Some("Olympia".to_string()),
            state_code: Some("WA".to_string()),
            zip5: Some("98501".to_string()),
            ..Default::default()
        });

        let project = prepare_project(&detail, &geocoder).await;
        assert_eq!(geocoder.call_count(), 1);
        assert!(project.has_coordinate());
    }

    #[tokio::test]
    async fn category_stays_unset() {
        let geocoder = CountingGeocoder::new();
        let detail = detail_with_place(PlaceOfPerformance::default());
        let project = prepare_project(&detail, &geocoder).await;
        assert!(project.category.is_none());
    }
}

//! Mapbox forward-geocoding client with a two-tier strategy: a structured
//! address lookup first, then a place-level "city, state" fallback.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{send_with_retry, Geocoder};
use crate::config::GeocoderConfig;
use crate::error::Result;
use crate::pipeline::rate_limiter::RateLimiter;
use crate::types::GeoCoordinate;

pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    limiter: RateLimiter,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// Wire order is [longitude, latitude].
    coordinates: [f64; 2],
}

impl FeatureCollection {
    fn first_coordinate(&self) -> Option<GeoCoordinate> {
        self.features.first().map(|feature| {
            let [longitude, latitude] = feature.geometry.coordinates;
            GeoCoordinate {
                latitude,
                longitude,
            }
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl MapboxGeocoder {
    pub fn new(config: &GeocoderConfig, access_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            access_token,
            limiter: RateLimiter::new(config.requests_per_min),
        })
    }

    /// Structured forward lookup against a full street address.
    async fn forward(
        &self,
        address: &str,
        city: &str,
        state: &str,
        zip: Option<&str>,
    ) -> Result<Option<GeoCoordinate>> {
        self.limiter.acquire().await;

        let mut params: Vec<(&str, &str)> = vec![
            ("address_line1", address),
            ("place", city),
            ("region", state),
            ("country", "US"),
            ("access_token", self.access_token.as_str()),
            ("limit", "1"),
        ];
        if let Some(zip) = zip {
            params.push(("postcode", zip));
        }

        let Some(response) =
            send_with_retry("mapbox", || self.client.get(&self.base_url).query(&params)).await
        else {
            return Ok(None);
        };

        if response.status() != StatusCode::OK {
            debug!(
                status = response.status().as_u16(),
                "forward geocoding returned non-200"
            );
            return Ok(None);
        }

        let collection: FeatureCollection = response.json().await?;
        Ok(collection.first_coordinate())
    }

    /// Place-level fallback: resolve the city/state centroid.
    async fn place_fallback(&self, city: &str, state: &str) -> Result<Option<GeoCoordinate>> {
        self.limiter.acquire().await;

        let query = format!("{}, {}, USA", city, state);
        let params = [
            ("q", query.as_str()),
            ("access_token", self.access_token.as_str()),
            ("limit", "1"),
            ("types", "place"),
            ("country", "US"),
        ];

        let Some(response) =
            send_with_retry("mapbox", || self.client.get(&self.base_url).query(&params)).await
        else {
            return Ok(None);
        };

        if response.status() != StatusCode::OK {
            debug!(
                status = response.status().as_u16(),
                "place fallback returned non-200"
            );
            return Ok(None);
        }

        let collection: FeatureCollection = response.json().await?;
        Ok(collection.first_coordinate())
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    #[instrument(skip(self))]
    async fn geocode(
        &self,
        address: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        zip: Option<&str>,
    ) -> Option<GeoCoordinate> {
        // Without at least city + state there is nothing to resolve, and
        // no request is worth issuing.
        let (Some(city), Some(state)) = (non_empty(city), non_empty(state)) else {
            return None;
        };

        if let Some(address) = non_empty(address) {
            match self.forward(address, city, state, non_empty(zip)).await {
                Ok(Some(coordinate)) => return Some(coordinate),
                Ok(None) => {}
                // Transport faults are never fatal here; the fallback still
                // gets its chance.
                Err(e) => warn!(error = %e, "forward geocoding failed"),
            }
        }

        debug!(city, state, "falling back to city centroid");
        match self.place_fallback(city, state).await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                warn!(error = %e, city, state, "place fallback failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_geocoder() -> MapboxGeocoder {
        // Unroutable base URL: any accidental request would error rather
        // than silently succeed.
        let config = GeocoderConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: 1,
            requests_per_min: 0,
        };
        MapboxGeocoder::new(&config, "test-token".to_string()).unwrap()
    }

    #[test]
    fn first_coordinate_swaps_wire_order() {
        let collection: FeatureCollection = serde_json::from_value(serde_json::json!({
            "features": [
                {"geometry": {"coordinates": [-77.0365, 38.8977]}},
                {"geometry": {"coordinates": [-122.3321, 47.6062]}}
            ]
        }))
        .unwrap();

        let coordinate = collection.first_coordinate().unwrap();
        assert_eq!(coordinate.latitude, 38.8977);
        assert_eq!(coordinate.longitude, -77.0365);
    }

    #[test]
    fn first_coordinate_empty_features_is_none() {
        let collection: FeatureCollection =
            serde_json::from_value(serde_json::json!({"features": []})).unwrap();
        assert!(collection.first_coordinate().is_none());

        let collection: FeatureCollection = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(collection.first_coordinate().is_none());
    }

    #[tokio::test]
    async fn missing_city_or_state_short_circuits() {
        let geocoder = test_geocoder();

        let result = geocoder
            .geocode(Some("1600 Pennsylvania Ave NW"), None, Some("DC"), None)
            .await;
        assert!(result.is_none());

        let result = geocoder
            .geocode(Some("1600 Pennsylvania Ave NW"), Some("Washington"), None, None)
            .await;
        assert!(result.is_none());

        // Empty strings count as missing, same as the wire sending nothing
        let result = geocoder.geocode(None, Some(""), Some("DC"), None).await;
        assert!(result.is_none());
    }
}

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{FetchError, SeismicEvent};

use super::{SeismicProvider, SeismicQuery};

const PROVIDER: &str = "usgs";
const BASE_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

// Provider defaults applied when the caller leaves a constraint unset.
const DEFAULT_MIN_MAGNITUDE: f64 = 4.0;
const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct UsgsProvider {
    http: Client,
}

impl UsgsProvider {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

#[async_trait]
impl SeismicProvider for UsgsProvider {
    async fn events(&self, query: &SeismicQuery) -> Result<Vec<SeismicEvent>, FetchError> {
        let res = self
            .http
            .get(BASE_URL)
            .query(&query_params(query))
            .send()
            .await
            .map_err(|e| FetchError::from_send_error(PROVIDER, &e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::from_send_error(PROVIDER, &e))?;

        if !status.is_success() {
            return Err(FetchError::rejected(PROVIDER, status, &body));
        }

        let parsed: UsgsResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::decode(PROVIDER, e))?;

        normalize(parsed)
    }
}

/// Caller constraints merged over the provider defaults. Absent optional
/// window bounds are omitted from the request entirely.
fn query_params(query: &SeismicQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("format", "geojson".to_string()),
        (
            "minmagnitude",
            query.min_magnitude.unwrap_or(DEFAULT_MIN_MAGNITUDE).to_string(),
        ),
        ("limit", query.limit.unwrap_or(DEFAULT_LIMIT).to_string()),
        ("orderby", "time".to_string()),
    ];

    if let Some(start) = &query.start_time {
        params.push(("starttime", start.clone()));
    }
    if let Some(end) = &query.end_time {
        params.push(("endtime", end.clone()));
    }

    params
}

#[derive(Debug, Deserialize)]
struct UsgsProperties {
    mag: f64,
    #[serde(default)]
    place: Option<String>,
    time: i64,
    #[serde(default)]
    tz: Option<i32>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct UsgsGeometry {
    // Positional [longitude, latitude, depth_km]; the order is a provider
    // contract, not re-derived.
    coordinates: (f64, f64, f64),
}

#[derive(Debug, Deserialize)]
struct UsgsFeature {
    id: String,
    properties: UsgsProperties,
    geometry: UsgsGeometry,
}

#[derive(Debug, Deserialize)]
struct UsgsResponse {
    features: Vec<UsgsFeature>,
}

/// Pure mapping from the raw USGS GeoJSON onto canonical events. Event times
/// are epoch-milliseconds; `mag` and `time` are required by the provider
/// schema, so their absence fails the decode upstream of this function.
fn normalize(raw: UsgsResponse) -> Result<Vec<SeismicEvent>, FetchError> {
    raw.features
        .into_iter()
        .map(|feature| {
            let millis = feature.properties.time;
            let time = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                FetchError::decode(PROVIDER, format!("event epoch {millis}ms out of range"))
            })?;

            let (longitude, latitude, depth) = feature.geometry.coordinates;

            Ok(SeismicEvent {
                source: PROVIDER.to_string(),
                id: feature.id,
                magnitude: feature.properties.mag,
                location: feature.properties.place.unwrap_or_default(),
                time,
                tz_offset: feature.properties.tz,
                url: feature.properties.url,
                longitude,
                latitude,
                depth,
            })
        })
        .collect()
}

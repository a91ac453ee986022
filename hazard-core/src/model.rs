use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical weather reading, normalized from any supported provider.
///
/// Metric units are requested at the call boundary, so values land here
/// as-is. Optional fields are omitted from JSON when the provider does not
/// supply them; they are never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    pub source: String,
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temp: Option<f64>,
    pub humidity: u8,
    pub pressure: f64,
    pub wind_speed: f64,
    pub condition: String,
    pub icon: String,
    pub timestamp: DateTime<Utc>,
}

/// Canonical seismic event, normalized from provider geometry/properties.
///
/// `longitude`/`latitude`/`depth` are taken positionally from the provider's
/// `[lon, lat, depth]` coordinate triple. `tz_offset` is signed minutes and
/// may be null upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeismicEvent {
    pub source: String,
    pub id: String,
    pub magnitude: f64,
    pub location: String,
    pub time: DateTime<Utc>,
    pub tz_offset: Option<i32>,
    pub url: String,
    pub longitude: f64,
    pub latitude: f64,
    pub depth: f64,
}

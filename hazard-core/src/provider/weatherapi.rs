use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{FetchError, WeatherObservation};

use super::WeatherProvider;

const PROVIDER: &str = "weatherapi";
const BASE_URL: &str = "http://api.weatherapi.com/v1/current.json";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current_by_city(&self, city: &str) -> Result<WeatherObservation, FetchError> {
        let res = self
            .http
            .get(BASE_URL)
            .query(&[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")])
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

        let parsed: WaResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::decode(PROVIDER, e))?;

        normalize(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    pressure_mb: f64,
    wind_kph: f64,
    condition: WaCondition,
    last_updated_epoch: i64,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

/// Pure mapping from the raw WeatherAPI payload onto the canonical shape.
///
/// WeatherAPI reports no min/max temperature in its current endpoint, so the
/// optional fields stay absent. Condition text and icon URL pass through
/// verbatim; wind stays in the metric unit the provider returns (km/h).
fn normalize(raw: WaResponse) -> Result<WeatherObservation, FetchError> {
    let epoch = raw.current.last_updated_epoch;
    let timestamp = DateTime::from_timestamp(epoch, 0)
        .ok_or_else(|| FetchError::decode(PROVIDER, format!("epoch {epoch} out of range")))?;

    Ok(WeatherObservation {
        source: PROVIDER.to_string(),
        city: raw.location.name,
        country: raw.location.country,
        temperature: raw.current.temp_c,
        feels_like: raw.current.feelslike_c,
        min_temp: None,
        max_temp: None,
        humidity: raw.current.humidity,
        pressure: raw.current.pressure_mb,
        wind_speed: raw.current.wind_kph,
        condition: raw.current.condition.text,
        icon: raw.current.condition.icon,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMA: &str = r#"{
        "location": { "name": "Lima", "country": "Peru" },
        "current": {
            "temp_c": 19.0,
            "feelslike_c": 18.2,
            "humidity": 83,
            "pressure_mb": 1013.0,
            "wind_kph": 11.2,
            "condition": {
                "text": "Overcast",
                "icon": "//cdn.weatherapi.com/weather/64x64/day/122.png"
            },
            "last_updated_epoch": 1678886100
        }
    }"#;

    #[test]
    fn normalizes_current_payload() {
        let raw: WaResponse = serde_json::from_str(LIMA).expect("sample payload must decode");
        let obs = normalize(raw).expect("normalize");

        assert_eq!(obs.source, "weatherapi");
        assert_eq!(obs.city, "Lima");
        assert_eq!(obs.country, "Peru");
        assert_eq!(obs.temperature, 19.0);
        assert_eq!(obs.pressure, 1013.0);
        assert_eq!(obs.wind_speed, 11.2);
        assert_eq!(obs.condition, "Overcast");
        // Icon passes through untouched, relative scheme included.
        assert_eq!(obs.icon, "//cdn.weatherapi.com/weather/64x64/day/122.png");
        assert_eq!(obs.timestamp.timestamp(), 1_678_886_100);
    }

    #[test]
    fn min_max_temps_stay_absent() {
        let raw: WaResponse = serde_json::from_str(LIMA).expect("sample payload must decode");
        let obs = normalize(raw).expect("normalize");

        assert_eq!(obs.min_temp, None);
        assert_eq!(obs.max_temp, None);
    }

    #[test]
    fn missing_required_field_fails_decode() {
        let truncated = r#"{
            "location": { "name": "Lima", "country": "Peru" },
            "current": { "temp_c": 19.0 }
        }"#;

        let result: Result<WaResponse, _> = serde_json::from_str(truncated);
        assert!(result.is_err());
    }
}

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{FetchError, WeatherObservation};

use super::WeatherProvider;

const PROVIDER: &str = "openweathermap";
const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherMapProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    async fn current_by_city(&self, city: &str) -> Result<WeatherObservation, FetchError> {
        // Metric units are requested here so the normalizer only renames.
        let res = self
            .http
            .get(BASE_URL)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
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

        let parsed: OwmResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::decode(PROVIDER, e))?;

        normalize(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    dt: i64,
    sys: OwmSys,
    main: OwmMain,
    weather: Vec<OwmWeather>,
    wind: OwmWind,
}

/// Pure mapping from the raw OpenWeatherMap payload onto the canonical
/// shape. `dt` is epoch-seconds; the relative icon code becomes an absolute
/// URL here.
fn normalize(raw: OwmResponse) -> Result<WeatherObservation, FetchError> {
    let timestamp = DateTime::from_timestamp(raw.dt, 0)
        .ok_or_else(|| FetchError::decode(PROVIDER, format!("epoch {} out of range", raw.dt)))?;

    let weather = raw
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::decode(PROVIDER, "empty weather array"))?;

    Ok(WeatherObservation {
        source: PROVIDER.to_string(),
        city: raw.name,
        country: raw.sys.country,
        temperature: raw.main.temp,
        feels_like: raw.main.feels_like,
        min_temp: raw.main.temp_min,
        max_temp: raw.main.temp_max,
        humidity: raw.main.humidity,
        pressure: raw.main.pressure,
        wind_speed: raw.wind.speed,
        condition: weather.description,
        icon: format!("{ICON_BASE_URL}/{}.png", weather.icon),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MADRID: &str = r#"{
        "name": "Madrid",
        "dt": 1678886400,
        "sys": { "country": "ES" },
        "main": {
            "temp": 21.5,
            "feels_like": 20.8,
            "temp_min": 18.0,
            "temp_max": 24.3,
            "humidity": 45,
            "pressure": 1018
        },
        "weather": [ { "description": "clear sky", "icon": "01d" } ],
        "wind": { "speed": 3.6 }
    }"#;

    const OSLO: &str = r#"{
        "name": "Oslo",
        "dt": 1678972800,
        "sys": { "country": "NO" },
        "main": {
            "temp": -1.2,
            "feels_like": -5.0,
            "temp_min": -3.0,
            "temp_max": 0.0,
            "humidity": 88,
            "pressure": 996
        },
        "weather": [ { "description": "light snow", "icon": "13d" } ],
        "wind": { "speed": 6.1 }
    }"#;

    fn parse(json: &str) -> OwmResponse {
        serde_json::from_str(json).expect("sample payload must decode")
    }

    #[test]
    fn normalizes_full_payload() {
        let obs = normalize(parse(MADRID)).expect("normalize");

        assert_eq!(obs.source, "openweathermap");
        assert_eq!(obs.city, "Madrid");
        assert_eq!(obs.country, "ES");
        assert_eq!(obs.temperature, 21.5);
        assert_eq!(obs.feels_like, 20.8);
        assert_eq!(obs.min_temp, Some(18.0));
        assert_eq!(obs.max_temp, Some(24.3));
        assert_eq!(obs.humidity, 45);
        assert_eq!(obs.pressure, 1018.0);
        assert_eq!(obs.wind_speed, 3.6);
        assert_eq!(obs.condition, "clear sky");
        assert_eq!(obs.icon, "https://openweathermap.org/img/wn/01d.png");
        assert_eq!(obs.timestamp.timestamp(), 1_678_886_400);
    }

    #[test]
    fn back_to_back_payloads_share_no_fields() {
        let first = normalize(parse(MADRID)).expect("normalize");
        let second = normalize(parse(OSLO)).expect("normalize");

        assert_eq!(second.city, "Oslo");
        assert_eq!(second.country, "NO");
        assert_eq!(second.temperature, -1.2);
        assert_eq!(second.condition, "light snow");
        assert_ne!(first.city, second.city);
        assert_ne!(first.timestamp, second.timestamp);
        // Max temp of zero survives as a real value, not an omission.
        assert_eq!(second.max_temp, Some(0.0));
    }

    #[test]
    fn empty_weather_array_is_a_local_fault() {
        let mut raw = parse(MADRID);
        raw.weather.clear();

        let err = normalize(raw).unwrap_err();
        assert!(matches!(err, FetchError::LocalFault { provider: "openweathermap", .. }));
    }
}

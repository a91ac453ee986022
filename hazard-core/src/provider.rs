use crate::{
    Config, FetchError, SeismicEvent, WeatherObservation,
    provider::{
        emsc::EmscProvider, openweathermap::OpenWeatherMapProvider, usgs::UsgsProvider,
        weatherapi::WeatherApiProvider,
    },
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod emsc;
pub mod openweathermap;
pub mod usgs;
pub mod weatherapi;

/// Closed set of live weather sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherSource {
    OpenWeatherMap,
    WeatherApi,
}

impl WeatherSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherSource::OpenWeatherMap => "openweathermap",
            WeatherSource::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [WeatherSource] {
        &[WeatherSource::OpenWeatherMap, WeatherSource::WeatherApi]
    }

    pub(crate) const SUPPORTED: &'static str = "openweathermap, weatherapi";
}

impl std::fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WeatherSource {
    type Error = FetchError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweathermap" => Ok(WeatherSource::OpenWeatherMap),
            "weatherapi" => Ok(WeatherSource::WeatherApi),
            _ => Err(FetchError::UnknownSource {
                domain: "weather",
                value: value.to_string(),
                supported: WeatherSource::SUPPORTED,
            }),
        }
    }
}

/// Closed set of live seismic sources.
///
/// `Emsc` is recognized but its integration is a placeholder; requesting it
/// yields a distinct not-implemented outcome instead of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeismicSource {
    Usgs,
    Emsc,
}

impl SeismicSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeismicSource::Usgs => "usgs",
            SeismicSource::Emsc => "emsc",
        }
    }

    pub const fn all() -> &'static [SeismicSource] {
        &[SeismicSource::Usgs, SeismicSource::Emsc]
    }

    pub(crate) const SUPPORTED: &'static str = "usgs, emsc";
}

impl std::fmt::Display for SeismicSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SeismicSource {
    type Error = FetchError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "usgs" => Ok(SeismicSource::Usgs),
            "emsc" => Ok(SeismicSource::Emsc),
            _ => Err(FetchError::UnknownSource {
                domain: "seismic",
                value: value.to_string(),
                supported: SeismicSource::SUPPORTED,
            }),
        }
    }
}

/// Typed seismic query constraints, parsed and validated before dispatch.
/// Absent fields are omitted from the outbound request, never sent empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeismicQuery {
    pub min_magnitude: Option<f64>,
    pub limit: Option<u32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// One outbound call for the current conditions in `city`. No retries,
    /// no caching.
    async fn current_by_city(&self, city: &str) -> Result<WeatherObservation, FetchError>;
}

#[async_trait]
pub trait SeismicProvider: Send + Sync + Debug {
    /// One outbound call for recent events matching `query`. No retries,
    /// no caching.
    async fn events(&self, query: &SeismicQuery) -> Result<Vec<SeismicEvent>, FetchError>;
}

/// Construct a weather provider from config and explicit source.
pub fn weather_provider_from_config(
    source: WeatherSource,
    config: &Config,
) -> Result<Box<dyn WeatherProvider>, FetchError> {
    let api_key = config
        .provider_api_key(source.as_str())
        .ok_or(FetchError::MissingApiKey {
            provider: source.as_str(),
        })?;

    let boxed: Box<dyn WeatherProvider> = match source {
        WeatherSource::OpenWeatherMap => {
            Box::new(OpenWeatherMapProvider::new(api_key.to_owned()))
        }
        WeatherSource::WeatherApi => Box::new(WeatherApiProvider::new(api_key.to_owned())),
    };

    Ok(boxed)
}

/// Construct a seismic provider for an explicit source. USGS is keyless;
/// EMSC is the permanent placeholder.
pub fn seismic_provider(source: SeismicSource) -> Box<dyn SeismicProvider> {
    match source {
        SeismicSource::Usgs => Box::new(UsgsProvider::new()),
        SeismicSource::Emsc => Box::new(EmscProvider),
    }
}

//! Aggregation facade for the live-data path.
//!
//! Resolves the requested source against the closed source enums, normalizes
//! raw string parameters, dispatches to the matching provider client, and
//! applies the post-fetch filtering the upstream API cannot express. All
//! provider failures pass through with their classification intact; nothing
//! is retried or swallowed here.

use log::{info, warn};
use std::str::FromStr;

use crate::{
    Config, FetchError, SeismicEvent, WeatherObservation,
    provider::{self, SeismicQuery, SeismicSource, WeatherSource},
};

/// Raw seismic query parameters as received from the outer layer (e.g. an
/// HTTP query string). Numeric fields arrive as strings and are parsed
/// before dispatch; absent or empty values are omitted, never forwarded as
/// empty/NaN.
#[derive(Debug, Clone, Default)]
pub struct RawSeismicParams {
    pub min_magnitude: Option<String>,
    pub limit: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location_contains: Option<String>,
}

/// Fetch the current weather for `city` from the named source.
pub async fn fetch_weather(
    config: &Config,
    source: &str,
    city: &str,
) -> Result<WeatherObservation, FetchError> {
    let source = WeatherSource::try_from(source)?;

    if city.trim().is_empty() {
        return Err(FetchError::InvalidParam {
            name: "city",
            value: city.to_string(),
        });
    }

    let client = provider::weather_provider_from_config(source, config)?;

    match client.current_by_city(city).await {
        Ok(observation) => {
            info!("weather fetched source={source} city={}", observation.city);
            Ok(observation)
        }
        Err(err) => {
            warn!("weather fetch failed source={source} status={} error={err}", err.status_code());
            Err(err)
        }
    }
}

/// Fetch recent seismic events from the named source.
///
/// `location_contains` is applied after the fetch because the upstream API
/// has no native place-name filter; matching is case-insensitive.
pub async fn fetch_earthquakes(
    source: &str,
    params: &RawSeismicParams,
) -> Result<Vec<SeismicEvent>, FetchError> {
    let source = SeismicSource::try_from(source)?;
    let query = parse_seismic_query(params)?;

    let client = provider::seismic_provider(source);

    let mut events = match client.events(&query).await {
        Ok(events) => events,
        Err(err) => {
            warn!("seismic fetch failed source={source} status={} error={err}", err.status_code());
            return Err(err);
        }
    };

    if let Some(needle) = non_empty(&params.location_contains) {
        retain_location_contains(&mut events, &needle);
    }

    info!("seismic events fetched source={source} count={}", events.len());
    Ok(events)
}

fn parse_seismic_query(params: &RawSeismicParams) -> Result<SeismicQuery, FetchError> {
    Ok(SeismicQuery {
        min_magnitude: parse_opt("minMagnitude", &params.min_magnitude)?,
        limit: parse_opt("limit", &params.limit)?,
        start_time: non_empty(&params.start_time),
        end_time: non_empty(&params.end_time),
    })
}

/// Parse an optional numeric string; empty strings count as absent, anything
/// unparsable is a caller error.
fn parse_opt<T: FromStr>(name: &'static str, value: &Option<String>) -> Result<Option<T>, FetchError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| FetchError::InvalidParam {
            name,
            value: raw.to_string(),
        }),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn retain_location_contains(events: &mut Vec<SeismicEvent>, needle: &str) {
    let needle = needle.to_lowercase();
    events.retain(|event| event.location.to_lowercase().contains(&needle));
}

//! Persisted, user-submitted reports: entity types plus the thin service
//! layer over the store seam. The generic query machinery lives in
//! [`query`], the store seam and its in-memory implementation in [`store`].

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

use crate::ReportError;

pub mod query;
pub mod store;

use self::query::{ReportQuery, SortOrder, parse_date, parse_f64};
use self::store::ReportStore;

/// Closed enumeration of reportable weather conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Storm,
}

impl FromStr for WeatherCondition {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "sunny" => Ok(WeatherCondition::Sunny),
            "cloudy" => Ok(WeatherCondition::Cloudy),
            "rainy" => Ok(WeatherCondition::Rainy),
            "storm" => Ok(WeatherCondition::Storm),
            _ => Err(ReportError::InvalidParam {
                name: "condition",
                value: value.to_string(),
            }),
        }
    }
}

/// Behavior the generic query engine needs from a persisted report entity.
///
/// The same engine is instantiated for both report kinds; only the filter
/// fields and the sort-key whitelist differ.
pub trait Report: Clone + Send + Sync + 'static {
    type Filter: Default + Clone + Send + Sync;
    type SortKey: Copy + Default + Send + Sync;
    type Patch: Clone + Send + Sync;

    fn id(&self) -> Uuid;

    /// Whether this document satisfies every bound the filter carries.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Total order for one sort key. Implementations break ties by id so a
    /// sorted page is deterministic.
    fn compare(&self, other: &Self, key: Self::SortKey) -> Ordering;

    /// Apply a partial update: only supplied fields change, and the update
    /// timestamp is bumped.
    fn apply(&mut self, patch: &Self::Patch, now: DateTime<Utc>);

    /// Fold one recognized filter key into the filter; unrecognized keys are
    /// ignored (permissive filtering), unparsable values are caller errors.
    fn filter_from_pair(filter: &mut Self::Filter, key: &str, value: &str)
    -> Result<(), ReportError>;

    fn sort_key_from_str(raw: &str) -> Result<Self::SortKey, ReportError>;
}

// ---------------------------------------------------------------------------
// Weather reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub id: Uuid,
    pub city: String,
    pub temperature: f64,
    pub humidity: f64,
    pub condition: WeatherCondition,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a weather report. `date` defaults to creation time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWeatherReport {
    pub city: String,
    pub temperature: f64,
    pub humidity: f64,
    pub condition: WeatherCondition,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl NewWeatherReport {
    fn into_report(self, now: DateTime<Utc>) -> WeatherReport {
        WeatherReport {
            id: Uuid::new_v4(),
            city: self.city,
            temperature: self.temperature,
            humidity: self.humidity,
            condition: self.condition,
            date: self.date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReportPatch {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub condition: Option<WeatherCondition>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct WeatherReportFilter {
    pub city: Option<String>,
    pub condition: Option<WeatherCondition>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherSortKey {
    #[default]
    Date,
    Temperature,
    City,
}

impl Report for WeatherReport {
    type Filter = WeatherReportFilter;
    type SortKey = WeatherSortKey;
    type Patch = WeatherReportPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn matches(&self, filter: &WeatherReportFilter) -> bool {
        if let Some(city) = &filter.city
            && !self.city.to_lowercase().contains(&city.to_lowercase())
        {
            return false;
        }
        if let Some(condition) = filter.condition
            && self.condition != condition
        {
            return false;
        }
        if let Some(min) = filter.min_temperature
            && self.temperature < min
        {
            return false;
        }
        if let Some(max) = filter.max_temperature
            && self.temperature > max
        {
            return false;
        }
        if let Some(start) = filter.start_date
            && self.date < start
        {
            return false;
        }
        if let Some(end) = filter.end_date
            && self.date > end
        {
            return false;
        }
        true
    }

    fn compare(&self, other: &Self, key: WeatherSortKey) -> Ordering {
        let ord = match key {
            WeatherSortKey::Date => self.date.cmp(&other.date),
            WeatherSortKey::Temperature => self.temperature.total_cmp(&other.temperature),
            WeatherSortKey::City => self.city.to_lowercase().cmp(&other.city.to_lowercase()),
        };
        ord.then_with(|| self.id.cmp(&other.id))
    }

    fn apply(&mut self, patch: &WeatherReportPatch, now: DateTime<Utc>) {
        if let Some(city) = &patch.city {
            self.city = city.clone();
        }
        if let Some(temperature) = patch.temperature {
            self.temperature = temperature;
        }
        if let Some(humidity) = patch.humidity {
            self.humidity = humidity;
        }
        if let Some(condition) = patch.condition {
            self.condition = condition;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        self.updated_at = now;
    }

    fn filter_from_pair(
        filter: &mut WeatherReportFilter,
        key: &str,
        value: &str,
    ) -> Result<(), ReportError> {
        match key {
            "city" => filter.city = Some(value.to_string()),
            "condition" => filter.condition = Some(value.parse()?),
            "minTemperature" => filter.min_temperature = Some(parse_f64("minTemperature", value)?),
            "maxTemperature" => filter.max_temperature = Some(parse_f64("maxTemperature", value)?),
            "startDate" => filter.start_date = Some(parse_date("startDate", value)?),
            "endDate" => filter.end_date = Some(parse_date("endDate", value)?),
            _ => {}
        }
        Ok(())
    }

    fn sort_key_from_str(raw: &str) -> Result<WeatherSortKey, ReportError> {
        match raw.to_lowercase().as_str() {
            "date" => Ok(WeatherSortKey::Date),
            "temperature" => Ok(WeatherSortKey::Temperature),
            "city" => Ok(WeatherSortKey::City),
            _ => Err(ReportError::InvalidParam {
                name: "sortBy",
                value: raw.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Earthquake reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthquakeReport {
    pub id: Uuid,
    pub magnitude: f64,
    pub depth: f64,
    pub location: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an earthquake report. `date` is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEarthquakeReport {
    pub magnitude: f64,
    pub depth: f64,
    pub location: String,
    pub date: DateTime<Utc>,
}

impl NewEarthquakeReport {
    fn into_report(self, now: DateTime<Utc>) -> EarthquakeReport {
        EarthquakeReport {
            id: Uuid::new_v4(),
            magnitude: self.magnitude,
            depth: self.depth,
            location: self.location,
            date: self.date,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthquakeReportPatch {
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct EarthquakeReportFilter {
    pub location: Option<String>,
    pub min_magnitude: Option<f64>,
    pub max_magnitude: Option<f64>,
    pub min_depth: Option<f64>,
    pub max_depth: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EarthquakeSortKey {
    #[default]
    Date,
    Magnitude,
    Depth,
    Location,
}

impl Report for EarthquakeReport {
    type Filter = EarthquakeReportFilter;
    type SortKey = EarthquakeSortKey;
    type Patch = EarthquakeReportPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn matches(&self, filter: &EarthquakeReportFilter) -> bool {
        if let Some(location) = &filter.location
            && !self.location.to_lowercase().contains(&location.to_lowercase())
        {
            return false;
        }
        if let Some(min) = filter.min_magnitude
            && self.magnitude < min
        {
            return false;
        }
        if let Some(max) = filter.max_magnitude
            && self.magnitude > max
        {
            return false;
        }
        if let Some(min) = filter.min_depth
            && self.depth < min
        {
            return false;
        }
        if let Some(max) = filter.max_depth
            && self.depth > max
        {
            return false;
        }
        if let Some(start) = filter.start_date
            && self.date < start
        {
            return false;
        }
        if let Some(end) = filter.end_date
            && self.date > end
        {
            return false;
        }
        true
    }

    fn compare(&self, other: &Self, key: EarthquakeSortKey) -> Ordering {
        let ord = match key {
            EarthquakeSortKey::Date => self.date.cmp(&other.date),
            EarthquakeSortKey::Magnitude => self.magnitude.total_cmp(&other.magnitude),
            EarthquakeSortKey::Depth => self.depth.total_cmp(&other.depth),
            EarthquakeSortKey::Location => {
                self.location.to_lowercase().cmp(&other.location.to_lowercase())
            }
        };
        ord.then_with(|| self.id.cmp(&other.id))
    }

    fn apply(&mut self, patch: &EarthquakeReportPatch, now: DateTime<Utc>) {
        if let Some(magnitude) = patch.magnitude {
            self.magnitude = magnitude;
        }
        if let Some(depth) = patch.depth {
            self.depth = depth;
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        self.updated_at = now;
    }

    fn filter_from_pair(
        filter: &mut EarthquakeReportFilter,
        key: &str,
        value: &str,
    ) -> Result<(), ReportError> {
        match key {
            "location" => filter.location = Some(value.to_string()),
            "minMagnitude" => filter.min_magnitude = Some(parse_f64("minMagnitude", value)?),
            "maxMagnitude" => filter.max_magnitude = Some(parse_f64("maxMagnitude", value)?),
            "minDepth" => filter.min_depth = Some(parse_f64("minDepth", value)?),
            "maxDepth" => filter.max_depth = Some(parse_f64("maxDepth", value)?),
            "startDate" => filter.start_date = Some(parse_date("startDate", value)?),
            "endDate" => filter.end_date = Some(parse_date("endDate", value)?),
            _ => {}
        }
        Ok(())
    }

    fn sort_key_from_str(raw: &str) -> Result<EarthquakeSortKey, ReportError> {
        match raw.to_lowercase().as_str() {
            "date" => Ok(EarthquakeSortKey::Date),
            "magnitude" => Ok(EarthquakeSortKey::Magnitude),
            "depth" => Ok(EarthquakeSortKey::Depth),
            "location" => Ok(EarthquakeSortKey::Location),
            _ => Err(ReportError::InvalidParam {
                name: "sortBy",
                value: raw.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Service layer: single-document operations over the store seam
// ---------------------------------------------------------------------------

pub async fn create_weather_report<S>(
    store: &S,
    input: NewWeatherReport,
) -> Result<WeatherReport, ReportError>
where
    S: ReportStore<WeatherReport> + ?Sized,
{
    let report = input.into_report(Utc::now());
    store.insert(report.clone()).await?;
    info!("weather report created id={}", report.id);
    Ok(report)
}

pub async fn create_earthquake_report<S>(
    store: &S,
    input: NewEarthquakeReport,
) -> Result<EarthquakeReport, ReportError>
where
    S: ReportStore<EarthquakeReport> + ?Sized,
{
    let report = input.into_report(Utc::now());
    store.insert(report.clone()).await?;
    info!("earthquake report created id={}", report.id);
    Ok(report)
}

pub async fn get_report<R, S>(store: &S, id: Uuid) -> Result<R, ReportError>
where
    R: Report,
    S: ReportStore<R> + ?Sized,
{
    store.get(id).await?.ok_or(ReportError::NotFound(id))
}

/// Partial update: only the supplied fields change. A missing id is a
/// distinct NotFound outcome, never a silent no-op.
pub async fn update_report<R, S>(store: &S, id: Uuid, patch: &R::Patch) -> Result<R, ReportError>
where
    R: Report,
    S: ReportStore<R> + ?Sized,
{
    match store.update(id, patch).await? {
        Some(report) => {
            info!("report updated id={id}");
            Ok(report)
        }
        None => Err(ReportError::NotFound(id)),
    }
}

pub async fn delete_report<R, S>(store: &S, id: Uuid) -> Result<R, ReportError>
where
    R: Report,
    S: ReportStore<R> + ?Sized,
{
    match store.delete(id).await? {
        Some(report) => {
            info!("report deleted id={id}");
            Ok(report)
        }
        None => Err(ReportError::NotFound(id)),
    }
}

/// All weather reports for a city, newest first, unpaged.
pub async fn weather_history_by_city<S>(
    store: &S,
    city: &str,
) -> Result<Vec<WeatherReport>, ReportError>
where
    S: ReportStore<WeatherReport> + ?Sized,
{
    let filter = WeatherReportFilter {
        city: Some(city.to_string()),
        ..Default::default()
    };
    store.find(&filter, WeatherSortKey::Date, SortOrder::Desc, 0, u64::MAX).await
}

/// All earthquake reports matching a location fragment, newest first, unpaged.
pub async fn earthquake_history_by_location<S>(
    store: &S,
    location: &str,
) -> Result<Vec<EarthquakeReport>, ReportError>
where
    S: ReportStore<EarthquakeReport> + ?Sized,
{
    let filter = EarthquakeReportFilter {
        location: Some(location.to_string()),
        ..Default::default()
    };
    store.find(&filter, EarthquakeSortKey::Date, SortOrder::Desc, 0, u64::MAX).await
}

/// Convenience alias: a parsed query for one report kind.
pub type WeatherReportQuery = ReportQuery<WeatherReport>;
pub type EarthquakeReportQuery = ReportQuery<EarthquakeReport>;

#[cfg(test)]
mod tests {
    use super::*;
    use super::store::MemoryStore;
    use chrono::TimeZone;

    fn sample_weather() -> NewWeatherReport {
        NewWeatherReport {
            city: "Caracas".into(),
            temperature: 25.0,
            humidity: 70.0,
            condition: WeatherCondition::Sunny,
            date: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_every_required_field() {
        let store = MemoryStore::new();

        let created = create_weather_report(&store, sample_weather()).await.expect("create");
        let fetched: WeatherReport = get_report(&store, created.id).await.expect("get");

        assert_eq!(fetched, created);
        assert_eq!(fetched.city, "Caracas");
        assert_eq!(fetched.temperature, 25.0);
        assert_eq!(fetched.humidity, 70.0);
        assert_eq!(fetched.condition, WeatherCondition::Sunny);
    }

    #[tokio::test]
    async fn partial_update_touches_only_supplied_fields() {
        let store = MemoryStore::new();
        let created = create_weather_report(&store, sample_weather()).await.expect("create");

        let patch = WeatherReportPatch {
            temperature: Some(30.0),
            ..Default::default()
        };
        let updated: WeatherReport = update_report(&store, created.id, &patch).await.expect("update");

        assert_eq!(updated.temperature, 30.0);
        assert_eq!(updated.city, created.city);
        assert_eq!(updated.humidity, created.humidity);
        assert_eq!(updated.condition, created.condition);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let store: MemoryStore<WeatherReport> = MemoryStore::new();
        let id = Uuid::new_v4();

        let err = update_report(&store, id, &WeatherReportPatch::default()).await.unwrap_err();
        assert_eq!(err, ReportError::NotFound(id));
    }

    #[tokio::test]
    async fn delete_removes_and_second_delete_is_not_found() {
        let store = MemoryStore::new();
        let created = create_weather_report(&store, sample_weather()).await.expect("create");

        let deleted: WeatherReport = delete_report(&store, created.id).await.expect("delete");
        assert_eq!(deleted.id, created.id);

        let err = delete_report::<WeatherReport, _>(&store, created.id).await.unwrap_err();
        assert_eq!(err, ReportError::NotFound(created.id));
    }

    #[tokio::test]
    async fn history_is_filtered_by_city_and_sorted_newest_first() {
        let store = MemoryStore::new();

        for (city, day) in [("Caracas", 1), ("Lima", 2), ("Caracas", 3)] {
            let input = NewWeatherReport {
                city: city.into(),
                date: Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()),
                ..sample_weather()
            };
            create_weather_report(&store, input).await.expect("create");
        }

        let history = weather_history_by_city(&store, "caracas").await.expect("history");

        assert_eq!(history.len(), 2);
        assert!(history[0].date > history[1].date);
        assert!(history.iter().all(|r| r.city == "Caracas"));
    }

    #[test]
    fn condition_parses_case_insensitively() {
        assert_eq!("Sunny".parse::<WeatherCondition>().unwrap(), WeatherCondition::Sunny);
        assert_eq!("storm".parse::<WeatherCondition>().unwrap(), WeatherCondition::Storm);

        let err = "drizzle".parse::<WeatherCondition>().unwrap_err();
        assert!(matches!(err, ReportError::InvalidParam { name: "condition", .. }));
    }

    #[test]
    fn range_bounds_are_independent() {
        let report = EarthquakeReport {
            id: Uuid::new_v4(),
            magnitude: 5.5,
            depth: 30.0,
            location: "Chile".into(),
            date: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let lower_only = EarthquakeReportFilter {
            min_magnitude: Some(5.0),
            ..Default::default()
        };
        let upper_only = EarthquakeReportFilter {
            max_magnitude: Some(5.0),
            ..Default::default()
        };

        // A lower bound alone must not imply any upper bound.
        assert!(report.matches(&lower_only));
        assert!(!report.matches(&upper_only));
    }
}

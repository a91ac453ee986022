//! Core library for the hazard data aggregator.
//!
//! This crate defines:
//! - Configuration & credentials handling for live providers
//! - Provider clients and normalizers for weather and seismic sources
//! - Transport error classification and the aggregation facade
//! - Persisted report entities with a generic filter/sort/paginate engine
//!
//! It is used by `hazard-cli`, but can also be reused by other binaries or
//! services (e.g. an HTTP API layer).

pub mod config;
pub mod error;
pub mod facade;
pub mod model;
pub mod provider;
pub mod report;

pub use config::{Config, ProviderConfig};
pub use error::{FetchError, ReportError};
pub use facade::{RawSeismicParams, fetch_earthquakes, fetch_weather};
pub use model::{SeismicEvent, WeatherObservation};
pub use provider::{
    SeismicProvider, SeismicQuery, SeismicSource, WeatherProvider, WeatherSource,
};
pub use report::{
    EarthquakeReport, EarthquakeReportFilter, EarthquakeReportPatch, EarthquakeSortKey,
    NewEarthquakeReport, NewWeatherReport, Report, WeatherCondition, WeatherReport,
    WeatherReportFilter, WeatherReportPatch, WeatherSortKey,
    query::{PageEnvelope, PageParams, ReportQuery, SortOrder, query_page},
    store::{MemoryStore, ReportStore},
};

//! Generic filter/sort/paginate query engine over the store seam.
//!
//! Translates an open set of optional string parameters into a bounded,
//! deterministic store query, identically for both report kinds. The engine
//! performs two reads against the identical predicate: one bounded find for
//! the page contents and one unbounded count for the total. The two numbers
//! are consistent with each other only in the absence of concurrent writes;
//! that gap is an accepted tradeoff, not something to lock around.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::str::FromStr;

use crate::ReportError;

use super::{Report, store::ReportStore};

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;

/// Sort direction. Strictly binary, no multi-key sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ReportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ReportError::InvalidParam {
                name: "sortOrder",
                value: value.to_string(),
            }),
        }
    }
}

/// Validated pagination window. Both numbers are positive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    pub fn new(page: Option<&str>, limit: Option<&str>) -> Result<Self, ReportError> {
        Ok(Self {
            page: parse_positive("page", page, DEFAULT_PAGE)?,
            limit: parse_positive("limit", limit, DEFAULT_LIMIT)?,
        })
    }

    pub fn skip(&self) -> u64 {
        // Saturates for enormous page numbers, which lands past every
        // document and yields an empty page.
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Paginated response wrapper: items plus paging metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// A fully parsed query for one report kind.
#[derive(Debug, Clone)]
pub struct ReportQuery<R: Report> {
    pub filter: R::Filter,
    pub sort_key: R::SortKey,
    pub sort_order: SortOrder,
    pub page: PageParams,
}

impl<R: Report> Default for ReportQuery<R> {
    fn default() -> Self {
        Self {
            filter: R::Filter::default(),
            sort_key: R::SortKey::default(),
            sort_order: SortOrder::default(),
            page: PageParams::default(),
        }
    }
}

impl<R: Report> ReportQuery<R> {
    /// Build a query from raw key/value parameters.
    ///
    /// Recognized keys with unparsable values are caller errors; unrecognized
    /// keys are ignored; empty values count as absent. Defaults: page 1,
    /// limit 10, sort by date descending.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = R::Filter::default();
        let mut sort_key = R::SortKey::default();
        let mut sort_order = SortOrder::default();
        let mut page = None;
        let mut limit = None;

        for (key, value) in pairs {
            if value.trim().is_empty() {
                continue;
            }
            match key {
                "page" => page = Some(value),
                "limit" => limit = Some(value),
                "sortBy" => sort_key = R::sort_key_from_str(value)?,
                "sortOrder" => sort_order = value.parse()?,
                other => R::filter_from_pair(&mut filter, other, value)?,
            }
        }

        Ok(Self {
            filter,
            sort_key,
            sort_order,
            page: PageParams::new(page, limit)?,
        })
    }
}

/// Run one page of a report query: bounded find plus unbounded count.
pub async fn query_page<R, S>(store: &S, query: &ReportQuery<R>) -> Result<PageEnvelope<R>, ReportError>
where
    R: Report,
    S: ReportStore<R> + ?Sized,
{
    let total_count = store.count(&query.filter).await?;
    let data = store
        .find(
            &query.filter,
            query.sort_key,
            query.sort_order,
            query.page.skip(),
            query.page.limit,
        )
        .await?;

    Ok(PageEnvelope {
        data,
        total_count,
        page: query.page.page,
        limit: query.page.limit,
        total_pages: total_count.div_ceil(query.page.limit),
    })
}

fn parse_positive(name: &'static str, raw: Option<&str>, default: u64) -> Result<u64, ReportError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ReportError::InvalidParam {
            name,
            value: raw.to_string(),
        }),
    }
}

pub(crate) fn parse_f64(name: &'static str, raw: &str) -> Result<f64, ReportError> {
    raw.trim().parse().map_err(|_| ReportError::InvalidParam {
        name,
        value: raw.to_string(),
    })
}

/// Accepts RFC 3339 instants or bare `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_date(name: &'static str, raw: &str) -> Result<DateTime<Utc>, ReportError> {
    let raw = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| ReportError::InvalidParam {
            name,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{
        EarthquakeReport, EarthquakeSortKey, NewEarthquakeReport, WeatherReport,
        create_earthquake_report, store::MemoryStore,
    };
    use chrono::TimeZone;

    fn quake(magnitude: f64, location: &str, day: u32) -> NewEarthquakeReport {
        NewEarthquakeReport {
            magnitude,
            depth: 25.0,
            location: location.into(),
            date: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
        }
    }

    async fn seeded_store(specs: &[(f64, &str, u32)]) -> MemoryStore<EarthquakeReport> {
        let store = MemoryStore::new();
        for (magnitude, location, day) in specs {
            create_earthquake_report(&store, quake(*magnitude, location, *day))
                .await
                .expect("seed");
        }
        store
    }

    #[tokio::test]
    async fn min_magnitude_filter_returns_exact_matches() {
        let store = seeded_store(&[(4.0, "Peru", 1), (5.5, "Chile", 2), (6.0, "Japan", 3)]).await;

        let query = ReportQuery::<EarthquakeReport>::from_pairs([("minMagnitude", "5.0")])
            .expect("parse");
        let page = query_page(&store, &query).await.expect("query");

        assert_eq!(page.total_count, 2);
        assert_eq!(page.data.len(), 2);
        assert!(page.data.iter().all(|r| r.magnitude >= 5.0));
    }

    #[tokio::test]
    async fn pages_partition_the_result_set() {
        let specs: Vec<(f64, &str, u32)> =
            (1..=7).map(|day| (4.0 + day as f64 / 10.0, "somewhere", day)).collect();
        let store = seeded_store(&specs).await;

        let total: u64 = 7;
        let limit: u64 = 3;
        let mut seen = Vec::new();

        for page_no in 1..=total.div_ceil(limit) {
            let page_str = page_no.to_string();
            let query = ReportQuery::<EarthquakeReport>::from_pairs([
                ("page", page_str.as_str()),
                ("limit", "3"),
            ])
            .expect("parse");
            let page = query_page(&store, &query).await.expect("query");

            assert_eq!(page.total_count, total);
            assert_eq!(page.total_pages, total.div_ceil(limit));
            assert!(page.data.len() as u64 <= limit);
            seen.extend(page.data.into_iter().map(|r| r.id));
        }

        seen.sort();
        seen.dedup();
        assert_eq!(seen.len() as u64, total);
    }

    #[tokio::test]
    async fn empty_result_set_has_zero_pages() {
        let store: MemoryStore<EarthquakeReport> = MemoryStore::new();

        let query = ReportQuery::<EarthquakeReport>::default();
        let page = query_page(&store, &query).await.expect("query");

        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn default_sort_is_date_descending() {
        let store = seeded_store(&[(5.0, "a", 1), (5.0, "b", 3), (5.0, "c", 2)]).await;

        let query = ReportQuery::<EarthquakeReport>::default();
        let page = query_page(&store, &query).await.expect("query");

        let dates: Vec<_> = page.data.iter().map(|r| r.date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[tokio::test]
    async fn ascending_magnitude_sort_is_honored() {
        let store = seeded_store(&[(6.0, "a", 1), (4.5, "b", 2), (5.2, "c", 3)]).await;

        let query = ReportQuery::<EarthquakeReport>::from_pairs([
            ("sortBy", "magnitude"),
            ("sortOrder", "asc"),
        ])
        .expect("parse");
        let page = query_page(&store, &query).await.expect("query");

        let magnitudes: Vec<_> = page.data.iter().map(|r| r.magnitude).collect();
        assert_eq!(magnitudes, vec![4.5, 5.2, 6.0]);
    }

    #[test]
    fn parse_defaults_and_ignores_unknown_keys() {
        let query = ReportQuery::<EarthquakeReport>::from_pairs([
            ("utm_source", "newsletter"),
            ("frobnicate", "yes"),
        ])
        .expect("unknown keys must be ignored");

        assert_eq!(query.page, PageParams::default());
        assert_eq!(query.sort_key, EarthquakeSortKey::Date);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn empty_values_count_as_absent() {
        let query = ReportQuery::<EarthquakeReport>::from_pairs([
            ("minMagnitude", ""),
            ("page", "  "),
        ])
        .expect("empty values must be skipped");

        assert_eq!(query.filter.min_magnitude, None);
        assert_eq!(query.page.page, DEFAULT_PAGE);
    }

    #[test]
    fn invalid_page_and_limit_are_rejected() {
        for (key, value) in [("page", "0"), ("page", "-1"), ("limit", "lots")] {
            let err = ReportQuery::<WeatherReport>::from_pairs([(key, value)]).unwrap_err();
            assert!(matches!(err, ReportError::InvalidParam { .. }), "{key}={value}");
        }
    }

    #[tokio::test]
    async fn huge_page_number_yields_an_empty_page() {
        let store = seeded_store(&[(5.0, "a", 1), (5.5, "b", 2)]).await;

        let query = ReportQuery::<EarthquakeReport>::from_pairs([
            ("page", "18446744073709551615"),
            ("limit", "10"),
        ])
        .expect("u64::MAX is a positive integer");
        assert_eq!(query.page.skip(), u64::MAX);

        let page = query_page(&store, &query).await.expect("query");
        assert!(page.data.is_empty());
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn invalid_sort_key_is_rejected() {
        let err = ReportQuery::<EarthquakeReport>::from_pairs([("sortBy", "color")]).unwrap_err();
        assert!(matches!(err, ReportError::InvalidParam { name: "sortBy", .. }));
    }

    #[test]
    fn parse_date_accepts_bare_dates_and_rfc3339() {
        let midnight = parse_date("startDate", "2024-03-05").expect("bare date");
        assert_eq!(midnight, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());

        let instant = parse_date("endDate", "2024-03-05T10:30:00Z").expect("rfc3339");
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap());

        assert!(parse_date("startDate", "yesterday").is_err());
    }
}

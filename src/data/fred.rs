//! FRED API integration.
//!
//! Observations are requested in ascending date order for an explicit date
//! range. FRED may return data ending earlier than the requested end date
//! (e.g. a monthly series whose latest month has not been published yet), so
//! callers must take the actual end date from the returned data.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{DATE_FORMAT, DatedTable, TimePoint};
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
/// FRED's maximum page size; every series used here fits in one page.
const OBS_LIMIT: usize = 100_000;

/// Anything that can produce a dated series for a symbol and date range.
pub trait SeriesSource {
    fn fetch_series(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError>;

    /// Fetch several series and outer-join them on date, columns in the order given.
    fn fetch_table(&self, series_ids: &[&str], start: NaiveDate, end: NaiveDate) -> Result<DatedTable, AppError> {
        let mut joined: Option<DatedTable> = None;
        for &id in series_ids {
            let points = self.fetch_series(id, start, end)?;
            let table = DatedTable::from_series(id, &points);
            joined = Some(match joined {
                None => table,
                Some(acc) => acc.outer_join(&table),
            });
        }
        joined.ok_or_else(|| AppError::input("No series requested."))
    }
}

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::input("Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }
}

impl SeriesSource for FredClient {
    fn fetch_series(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimePoint>, AppError> {
        log::info!("fetching {series_id} from FRED ({start} .. {end})");
        let start = start.format(DATE_FORMAT).to_string();
        let end = end.format(DATE_FORMAT).to_string();
        let limit = OBS_LIMIT.to_string();

        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .map_err(|e| AppError::fetch(format!("FRED request for {series_id} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "FRED request for {series_id} failed with status {}.",
                resp.status()
            )));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::fetch(format!("Failed to parse FRED response for {series_id}: {e}")))?;

        // A series can legitimately have no data in the range (DFEDTARU starts
        // 2008-12-16); callers decide whether an empty result is fatal.
        let points = observations_to_points(body.observations)?;
        if points.is_empty() {
            log::warn!("FRED returned no observations for {series_id} between {start} and {end}");
        }
        Ok(points)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn observations_to_points(observations: Vec<Observation>) -> Result<Vec<TimePoint>, AppError> {
    let mut out = Vec::with_capacity(observations.len());
    for obs in observations {
        let date = NaiveDate::parse_from_str(&obs.date, DATE_FORMAT)
            .map_err(|e| AppError::fetch(format!("Invalid FRED date '{}': {e}", obs.date)))?;
        out.push(TimePoint::new(date, parse_value(&obs.value)));
    }
    out.sort_by_key(|p| p.date);
    out.dedup_by_key(|p| p.date);
    Ok(out)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fred_missing_marker_becomes_none() {
        let obs = vec![
            Observation {
                date: "2020-01-02".into(),
                value: "1.55".into(),
            },
            Observation {
                date: "2020-01-01".into(),
                value: ".".into(),
            },
        ];
        let points = observations_to_points(obs).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, None);
        assert_eq!(points[1].value, Some(1.55));
    }

    #[test]
    fn response_json_deserializes() {
        let body = r#"{"realtime_start":"2024-01-01","observations":[
            {"realtime_start":"2024-01-01","realtime_end":"2024-01-01","date":"1939-01-01","value":"29923"}]}"#;
        let parsed: ObservationsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.observations[0].value, "29923");
    }

    #[test]
    fn empty_observation_list_is_not_an_error() {
        let body = r#"{"observations":[]}"#;
        let parsed: ObservationsResponse = serde_json::from_str(body).unwrap();
        assert!(observations_to_points(parsed.observations).unwrap().is_empty());
    }

    #[test]
    fn bad_date_is_a_fetch_error() {
        let obs = vec![Observation {
            date: "01/02/2020".into(),
            value: "1".into(),
        }];
        let err = observations_to_points(obs).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Fetch);
    }
}

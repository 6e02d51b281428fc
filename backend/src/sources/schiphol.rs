//! Schiphol public flight API client.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LINK};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use super::{ErrorContext, FlightQuery, FlightSource, SourceError, SourceResult};

pub const DEFAULT_BASE_URL: &str = "https://api.schiphol.nl";
const FLIGHTS_PATH: &str = "/public-flights/flights";
const RESOURCE_VERSION: &str = "v4";

/// Connection settings for [`SchipholApiSource`].
#[derive(Debug, Clone)]
pub struct SchipholSettings {
    pub base_url: String,
    pub app_id: String,
    pub app_key: String,
    pub timeout: Duration,
    /// Upper bound on pages followed per fetch.
    pub max_pages: u32,
}

impl Default for SchipholSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: String::new(),
            app_key: String::new(),
            timeout: Duration::from_secs(10),
            max_pages: 5,
        }
    }
}

/// Fetches flights page by page. No retries; the cache serves the previous
/// snapshot when a fetch fails.
pub struct SchipholApiSource {
    client: reqwest::Client,
    settings: SchipholSettings,
}

impl SchipholApiSource {
    pub fn new(settings: SchipholSettings) -> SourceResult<Self> {
        if settings.app_id.trim().is_empty() || settings.app_key.trim().is_empty() {
            return Err(SourceError::configuration(
                "Schiphol source requires app_id and app_key",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("resourceversion", HeaderValue::from_static(RESOURCE_VERSION));
        headers.insert("app_id", header_value(&settings.app_id)?);
        headers.insert("app_key", header_value(&settings.app_key)?);

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                SourceError::http(e.to_string(), ErrorContext::new("build_client").with_source("schiphol"))
            })?;

        Ok(Self { client, settings })
    }

    fn url(&self) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), FLIGHTS_PATH)
    }

    fn query_params(query: &FlightQuery, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", page.to_string())];
        if let Some(direction) = query.direction {
            params.push(("flightDirection", direction.api_code().to_string()));
        }
        if let Some(date) = query.date {
            params.push(("scheduleDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(carrier) = &query.carrier {
            params.push(("airline", carrier.clone()));
        }
        params
    }

    /// One page of records and whether the API advertises a next page.
    async fn fetch_page(&self, query: &FlightQuery, page: u32) -> SourceResult<(Vec<Value>, bool)> {
        let context = || {
            ErrorContext::new("fetch_flights")
                .with_source("schiphol")
                .with_details(format!("page={}", page))
        };

        let response = self
            .client
            .get(self.url())
            .query(&Self::query_params(query, page))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::timeout(self.settings.timeout.as_secs(), context())
                } else {
                    SourceError::http(e.to_string(), context())
                }
            })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok((Vec::new(), false));
        }
        if !status.is_success() {
            return Err(SourceError::status(status.as_u16(), context()));
        }

        let has_next = response
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("rel=\"next\""));

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SourceError::decode(e.to_string(), context()))?;

        let records = match payload {
            Value::Object(mut map) => match map.remove("flights") {
                Some(Value::Array(records)) => records,
                _ => Vec::new(),
            },
            Value::Array(records) => records,
            _ => Vec::new(),
        };
        Ok((records, has_next))
    }
}

fn header_value(raw: &str) -> SourceResult<HeaderValue> {
    HeaderValue::from_str(raw.trim()).map_err(|e| {
        SourceError::configuration(format!("invalid credential header: {}", e))
    })
}

#[async_trait]
impl FlightSource for SchipholApiSource {
    fn name(&self) -> &str {
        "schiphol"
    }

    async fn fetch_flights(&self, query: &FlightQuery) -> SourceResult<Vec<Value>> {
        let mut records = Vec::new();
        for page in 0..self.settings.max_pages {
            let (mut batch, has_next) = match self.fetch_page(query, page).await {
                Ok(result) => result,
                // Keep what was already collected once the first page succeeded
                Err(err) if page > 0 => {
                    warn!("Stopping Schiphol pagination at page {}: {}", page, err);
                    break;
                }
                Err(err) => return Err(err),
            };
            let done = batch.is_empty() || !has_next;
            records.append(&mut batch);
            if done {
                break;
            }
        }
        debug!("Fetched {} flight records from Schiphol", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::NaiveDate;

    #[test]
    fn test_missing_credentials_rejected() {
        let result = SchipholApiSource::new(SchipholSettings::default());
        assert!(matches!(result, Err(SourceError::Configuration { .. })));
    }

    #[test]
    fn test_query_params() {
        let query = FlightQuery {
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
            direction: Some(Direction::Departure),
            carrier: Some("KL".to_string()),
        };
        let params = SchipholApiSource::query_params(&query, 2);
        assert!(params.contains(&("page", "2".to_string())));
        assert!(params.contains(&("flightDirection", "D".to_string())));
        assert!(params.contains(&("scheduleDate", "2024-05-01".to_string())));
        assert!(params.contains(&("airline", "KL".to_string())));
    }

    #[test]
    fn test_url_joins_base() {
        let source = SchipholApiSource::new(SchipholSettings {
            base_url: "https://api.example.test/".to_string(),
            app_id: "id".to_string(),
            app_key: "key".to_string(),
            ..SchipholSettings::default()
        })
        .unwrap();
        assert_eq!(source.url(), "https://api.example.test/public-flights/flights");
    }
}

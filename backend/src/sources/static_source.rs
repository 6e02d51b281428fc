//! In-memory and file-backed flight source.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{ErrorContext, FlightQuery, FlightSource, SourceError, SourceResult};

#[derive(Debug, Clone)]
enum Records {
    Memory(Vec<Value>),
    File(PathBuf),
}

/// Serves a fixed set of records, either held in memory or re-read from a
/// JSON file on every fetch.
///
/// The file holds either a bare array or an object with a `flights` array,
/// the same shape the Schiphol API returns per page.
#[derive(Debug, Clone)]
pub struct StaticFlightSource {
    records: Records,
}

impl StaticFlightSource {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records: Records::Memory(records),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            records: Records::File(path.as_ref().to_path_buf()),
        }
    }

    async fn read_file(path: &Path) -> SourceResult<Vec<Value>> {
        let context = || {
            ErrorContext::new("read_fixture")
                .with_source("static")
                .with_details(path.display().to_string())
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::io(e.to_string(), context()))?;
        let payload: Value = serde_json::from_str(&content)
            .map_err(|e| SourceError::decode(e.to_string(), context()))?;

        match payload {
            Value::Array(records) => Ok(records),
            Value::Object(mut map) => match map.remove("flights") {
                Some(Value::Array(records)) => Ok(records),
                _ => Err(SourceError::decode("expected a `flights` array", context())),
            },
            _ => Err(SourceError::decode(
                "expected an array or an object with `flights`",
                context(),
            )),
        }
    }
}

#[async_trait]
impl FlightSource for StaticFlightSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_flights(&self, _query: &FlightQuery) -> SourceResult<Vec<Value>> {
        match &self.records {
            Records::Memory(records) => Ok(records.clone()),
            Records::File(path) => Self::read_file(path).await,
        }
    }
}

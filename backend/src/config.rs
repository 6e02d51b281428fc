//! Application configuration file support.
//!
//! Reads `gate-ops.toml`. Every section has serde defaults, so an empty file
//! (or no file at all) yields a working configuration against the live API.

use chrono::Duration as ChronoDuration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::models::Direction;
use crate::services::dashboard::DashboardParams;
use crate::services::gate_status::UtilizationParams;
use crate::sources::{FlightSource, SourceError, StaticFlightSource};

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid configuration value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("No gate-ops.toml found in standard locations")]
    NotFound,
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub gates: GateSettings,
}

/// Upstream source selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// `schiphol` or `file`.
    #[serde(default = "default_source_kind")]
    pub kind: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_key: String,
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

/// Snapshot cache timings and size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Distinct queries cached at once.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Defaults applied to queries that leave a criterion unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub carrier_prefix: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Drop flights whose every state is a cancellation. Off by default so
    /// cancelled flights still show on the gate timeline.
    #[serde(default)]
    pub operational_only: bool,
}

/// Heuristic constants of the gate engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_simultaneous_capacity")]
    pub simultaneous_capacity: u32,
    #[serde(default = "default_operational_hours")]
    pub operational_hours: f64,
    #[serde(default = "default_average_turnaround_hours")]
    pub average_turnaround_hours: f64,
    #[serde(default = "default_active_window_hours")]
    pub active_window_hours: f64,
    #[serde(default = "default_pre_operational_hours")]
    pub pre_operational_hours: f64,
    #[serde(default = "default_display_window_hours")]
    pub display_window_hours: f64,
    #[serde(default = "default_min_visual_width_secs")]
    pub min_visual_width_secs: i64,
    #[serde(default = "default_worst_delay_limit")]
    pub worst_delay_limit: usize,
}

/// Manual gate overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateSettings {
    #[serde(default)]
    pub maintenance: Vec<String>,
}

fn default_source_kind() -> String {
    "schiphol".to_string()
}

fn default_base_url() -> String {
    "https://api.schiphol.nl".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

const MAX_TIMEOUT_SECS: u64 = 600;
const MAX_CACHE_SECS: u64 = 24 * 3600;
const MAX_CACHE_ENTRIES: usize = 10_000;
/// Roughly a century; keeps `now - max_age` inside chrono's range.
const MAX_AGE_HOURS: i64 = 1_000_000;
/// Upper bound for every hour-valued engine setting.
const MAX_ENGINE_HOURS: f64 = 24.0 * 31.0;
const MAX_MIN_VISUAL_WIDTH_SECS: i64 = 24 * 3600;

fn check_range<T>(field: &'static str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::invalid(
            field,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

/// Finite, at most [`MAX_ENGINE_HOURS`], and positive (or non-negative when `allow_zero`).
fn check_hours(field: &'static str, value: f64, allow_zero: bool) -> Result<(), ConfigError> {
    let lower_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !value.is_finite() || !lower_ok || value > MAX_ENGINE_HOURS {
        return Err(ConfigError::invalid(
            field,
            format!(
                "must be a finite number of hours in {}0, {}], got {}",
                if allow_zero { "[" } else { "(" },
                MAX_ENGINE_HOURS,
                value
            ),
        ));
    }
    Ok(())
}

fn default_max_pages() -> u32 {
    5
}

fn default_ttl_secs() -> u64 {
    180
}

fn default_refresh_interval_secs() -> u64 {
    120
}

fn default_max_entries() -> usize {
    crate::services::snapshot_cache::DEFAULT_MAX_ENTRIES
}

fn default_max_age_hours() -> i64 {
    24
}

fn default_timezone() -> String {
    "Europe/Amsterdam".to_string()
}

fn default_simultaneous_capacity() -> u32 {
    3
}

fn default_operational_hours() -> f64 {
    16.0
}

fn default_average_turnaround_hours() -> f64 {
    1.0
}

fn default_active_window_hours() -> f64 {
    2.0
}

fn default_pre_operational_hours() -> f64 {
    1.5
}

fn default_display_window_hours() -> f64 {
    12.0
}

fn default_min_visual_width_secs() -> i64 {
    60
}

fn default_worst_delay_limit() -> usize {
    10
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            base_url: default_base_url(),
            app_id: String::new(),
            app_key: String::new(),
            fixture_path: None,
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            carrier_prefix: None,
            direction: None,
            max_age_hours: default_max_age_hours(),
            timezone: default_timezone(),
            operational_only: false,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            simultaneous_capacity: default_simultaneous_capacity(),
            operational_hours: default_operational_hours(),
            average_turnaround_hours: default_average_turnaround_hours(),
            active_window_hours: default_active_window_hours(),
            pre_operational_hours: default_pre_operational_hours(),
            display_window_hours: default_display_window_hours(),
            min_visual_width_secs: default_min_visual_width_secs(),
            worst_delay_limit: default_worst_delay_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `gate-ops.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("gate-ops.toml"),
            PathBuf::from("backend/gate-ops.toml"),
            PathBuf::from("../gate-ops.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Credentials from `SCHIPHOL_APP_ID` and `SCHIPHOL_APP_KEY` win over the file.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(app_id) = env::var("SCHIPHOL_APP_ID") {
            if !app_id.trim().is_empty() {
                self.source.app_id = app_id;
            }
        }
        if let Ok(app_key) = env::var("SCHIPHOL_APP_KEY") {
            if !app_key.trim().is_empty() {
                self.source.app_key = app_key;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source.kind.as_str() {
            "schiphol" => {}
            "file" => {
                if self.source.fixture_path.is_none() {
                    return Err(ConfigError::invalid(
                        "source.fixture_path",
                        "required when source.kind = \"file\"",
                    ));
                }
            }
            other => {
                return Err(ConfigError::invalid(
                    "source.kind",
                    format!("unknown source kind '{}'", other),
                ))
            }
        }

        check_range("source.timeout_secs", self.source.timeout_secs, 1, MAX_TIMEOUT_SECS)?;
        check_range("cache.ttl_secs", self.cache.ttl_secs, 1, MAX_CACHE_SECS)?;
        check_range(
            "cache.refresh_interval_secs",
            self.cache.refresh_interval_secs,
            1,
            MAX_CACHE_SECS,
        )?;
        check_range("cache.max_entries", self.cache.max_entries, 1, MAX_CACHE_ENTRIES)?;
        check_range("filter.max_age_hours", self.filter.max_age_hours, 0, MAX_AGE_HOURS)?;
        self.timezone()?;
        self.default_direction()?;

        let engine = &self.engine;
        if engine.simultaneous_capacity == 0 {
            return Err(ConfigError::invalid(
                "engine.simultaneous_capacity",
                "must be positive",
            ));
        }
        check_hours("engine.operational_hours", engine.operational_hours, false)?;
        check_hours("engine.average_turnaround_hours", engine.average_turnaround_hours, false)?;
        check_hours("engine.active_window_hours", engine.active_window_hours, true)?;
        check_hours("engine.pre_operational_hours", engine.pre_operational_hours, true)?;
        check_hours("engine.display_window_hours", engine.display_window_hours, false)?;
        check_range(
            "engine.min_visual_width_secs",
            engine.min_visual_width_secs,
            0,
            MAX_MIN_VISUAL_WIDTH_SECS,
        )?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.filter
            .timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::invalid("filter.timezone", e.to_string()))
    }

    pub fn default_direction(&self) -> Result<Option<Direction>, ConfigError> {
        match self.filter.direction.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Direction::parse(raw).map(Some).ok_or_else(|| {
                ConfigError::invalid("filter.direction", format!("unknown direction '{}'", raw))
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.cache.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    /// Pipeline parameters derived from the `[filter]`, `[engine]` and `[gates]` sections.
    pub fn dashboard_params(&self) -> Result<DashboardParams, ConfigError> {
        let engine = &self.engine;
        Ok(DashboardParams {
            utilization: UtilizationParams {
                simultaneous_capacity: engine.simultaneous_capacity,
                operational_hours: engine.operational_hours,
                average_turnaround_hours: engine.average_turnaround_hours,
                active_window_hours: engine.active_window_hours,
                pre_operational_hours: engine.pre_operational_hours,
            },
            timezone: self.timezone()?,
            default_carrier: self
                .filter
                .carrier_prefix
                .clone()
                .filter(|c| !c.trim().is_empty()),
            default_direction: self.default_direction()?,
            max_age_hours: self.filter.max_age_hours,
            operational_only: self.filter.operational_only,
            display_window_hours: engine.display_window_hours,
            min_visual_width: ChronoDuration::seconds(engine.min_visual_width_secs),
            maintenance_gates: self.gates.maintenance.clone(),
            worst_delay_limit: engine.worst_delay_limit,
        })
    }

    /// Construct the configured upstream source.
    pub fn build_source(&self) -> Result<Arc<dyn FlightSource>, SourceError> {
        match self.source.kind.as_str() {
            "file" => {
                let path = self.source.fixture_path.as_ref().ok_or_else(|| {
                    SourceError::configuration("source.fixture_path is not set")
                })?;
                Ok(Arc::new(StaticFlightSource::from_file(path)))
            }
            #[cfg(feature = "schiphol-api")]
            "schiphol" => {
                use crate::sources::schiphol::{SchipholApiSource, SchipholSettings};
                let source = SchipholApiSource::new(SchipholSettings {
                    base_url: self.source.base_url.clone(),
                    app_id: self.source.app_id.clone(),
                    app_key: self.source.app_key.clone(),
                    timeout: self.fetch_timeout(),
                    max_pages: self.source.max_pages,
                })?;
                Ok(Arc::new(source))
            }
            #[cfg(not(feature = "schiphol-api"))]
            "schiphol" => Err(SourceError::configuration(
                "Schiphol source feature not enabled",
            )),
            other => Err(SourceError::configuration(format!(
                "unknown source kind '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.source.kind, "schiphol");
        assert_eq!(config.cache.ttl_secs, 180);
        assert_eq!(config.cache.refresh_interval_secs, 120);
        assert_eq!(config.filter.max_age_hours, 24);
        assert_eq!(config.engine.simultaneous_capacity, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[source]
kind = "file"
fixture_path = "flights.json"

[cache]
ttl_secs = 60
max_entries = 8

[filter]
carrier_prefix = "KL"
direction = "departure"
operational_only = true

[engine]
simultaneous_capacity = 4
display_window_hours = 6.0

[gates]
maintenance = ["D7", "E18"]
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        config.validate().unwrap();

        let params = config.dashboard_params().unwrap();
        assert_eq!(params.utilization.simultaneous_capacity, 4);
        assert_eq!(params.default_carrier.as_deref(), Some("KL"));
        assert_eq!(params.default_direction, Some(Direction::Departure));
        assert_eq!(params.display_window_hours, 6.0);
        assert!(params.is_under_maintenance("e18"));
        assert!(params.operational_only);
        assert_eq!(config.cache.max_entries, 8);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nttl_secs = 30").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.cache.refresh_interval_secs, 120);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache\nttl_secs = ").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_file("/nonexistent/gate-ops.toml"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.source.kind = "file".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.filter.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.filter.direction = Some("sideways".to_string());
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.engine.simultaneous_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_out_of_range_durations() {
        let infinite: AppConfig = toml::from_str("[engine]\ndisplay_window_hours = inf\n").unwrap();
        assert!(matches!(
            infinite.validate(),
            Err(ConfigError::Invalid { field: "engine.display_window_hours", .. })
        ));

        let ancient: AppConfig = toml::from_str("[filter]\nmax_age_hours = 3000000000\n").unwrap();
        assert!(matches!(
            ancient.validate(),
            Err(ConfigError::Invalid { field: "filter.max_age_hours", .. })
        ));

        let mut config = AppConfig::default();
        config.engine.active_window_hours = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.engine.pre_operational_hours = 1.0e12;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.cache.max_entries = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.engine.pre_operational_hours = 0.0;
        config.cache.ttl_secs = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_file_source() {
        let mut config = AppConfig::default();
        config.source.kind = "file".to_string();
        config.source.fixture_path = Some(PathBuf::from("flights.json"));
        let source = config.build_source().unwrap();
        assert_eq!(source.name(), "static");
    }
}

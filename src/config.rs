use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::DEFAULT_SWIPE_THRESHOLD;
use crate::models::{RankingWeights, MAX_RECOMMENDATIONS};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub selector: SelectorSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_viewed_weight")]
    pub viewed_weight: f64,
    #[serde(default = "default_liked_weight")]
    pub liked_weight: f64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            viewed_weight: default_viewed_weight(),
            liked_weight: default_liked_weight(),
            limit: default_limit(),
        }
    }
}

impl From<&RankingSettings> for RankingWeights {
    fn from(settings: &RankingSettings) -> Self {
        RankingWeights {
            viewed: settings.viewed_weight,
            liked: settings.liked_weight,
            limit: settings.limit,
        }
    }
}

impl RankingSettings {
    /// Weights must be finite and non-negative; the limit must be in 1..=10
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [("viewed_weight", self.viewed_weight), ("liked_weight", self.liked_weight)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Message(format!(
                    "ranking.{} must be a finite non-negative number, got {}",
                    name, weight
                )));
            }
        }

        if self.limit == 0 || self.limit > MAX_RECOMMENDATIONS {
            return Err(ConfigError::Message(format!(
                "ranking.limit must be between 1 and {}, got {}",
                MAX_RECOMMENDATIONS, self.limit
            )));
        }

        Ok(())
    }
}

fn default_viewed_weight() -> f64 { 1.0 }
fn default_liked_weight() -> f64 { 3.0 }
fn default_limit() -> usize { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct SelectorSettings {
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            swipe_threshold: default_swipe_threshold(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl SelectorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.swipe_threshold.is_finite() || self.swipe_threshold <= 0.0 {
            return Err(ConfigError::Message(format!(
                "selector.swipe_threshold must be a positive number, got {}",
                self.swipe_threshold
            )));
        }

        Ok(())
    }
}

fn default_settle_delay_ms() -> u64 { 300 }
fn default_swipe_threshold() -> f64 { DEFAULT_SWIPE_THRESHOLD }
fn default_max_sessions() -> u64 { 10_000 }
fn default_session_idle_secs() -> u64 { 1800 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ARTSPARK_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ARTSPARK__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("ARTSPARK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = apply_env_overrides(settings)?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ARTSPARK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the ranker and selector cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ranking.validate()?;
        self.selector.validate()
    }
}

/// Apply the conventional environment variables deployments set directly
///
/// `DATABASE_URL`, `REDIS_URL` and `CATALOG_ENDPOINT` win over file values.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", url)?;
    }
    if let Ok(endpoint) = env::var("CATALOG_ENDPOINT") {
        builder = builder.set_override("catalog.endpoint", endpoint)?;
    }

    builder.build()
}

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `PULSEBOARD__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "default_data_sources")]
    pub data_sources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_daily_days")]
    pub daily_days: i64,
    #[serde(default = "default_weekly_days")]
    pub weekly_days: i64,
    #[serde(default = "default_monthly_days")]
    pub monthly_days: i64,
    #[serde(default = "default_revenue_days")]
    pub revenue_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Demo login gate credentials. Plain comparison only.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
}

// Default functions
fn default_seed() -> u64 {
    42
}
fn default_daily_days() -> i64 {
    30
}
fn default_weekly_days() -> i64 {
    28
}
fn default_monthly_days() -> i64 {
    90
}
fn default_revenue_days() -> i64 {
    90
}
fn default_max_entries() -> usize {
    64
}
fn default_username() -> String {
    "admin".to_string()
}
fn default_password() -> String {
    "password".to_string()
}
fn default_data_sources() -> Vec<String> {
    vec![
        "PostgreSQL - Main Analytics".to_string(),
        "MySQL - User Analytics".to_string(),
        "SQLite - Application Logs".to_string(),
        "BigQuery - Marketing Data".to_string(),
    ]
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            daily_days: default_daily_days(),
            weekly_days: default_weekly_days(),
            monthly_days: default_monthly_days(),
            revenue_days: default_revenue_days(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            cache: CacheConfig::default(),
            auth: AuthConfig::default(),
            data_sources: default_data_sources(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_prefix(file, "PULSEBOARD")
    }

    fn load_with_prefix(file: Option<&Path>, prefix: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("data_sources"),
        );

        let config = builder.build()?;
        let loaded: Self = config.try_deserialize()?;
        debug!(
            data_sources = loaded.data_sources.len(),
            max_cache_entries = loaded.cache.max_entries,
            "Configuration resolved"
        );
        Ok(loaded)
    }

    /// The data source a fresh session starts on.
    pub fn default_data_source(&self) -> &str {
        self.data_sources
            .first()
            .map(String::as_str)
            .unwrap_or("PostgreSQL - Main Analytics")
    }
}

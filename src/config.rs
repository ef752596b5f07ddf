use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_FOOD_SEARCH_URL: &str = "https://platform.fatsecret.com/rest/server.api";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub food_search: FoodSearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory holding model and scaler artifacts
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,
    /// Load every category at startup instead of on the first request
    #[serde(default = "default_true")]
    pub preload: bool,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_true() -> bool {
    true
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            preload: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodSearchConfig {
    #[serde(default = "default_food_search_url")]
    pub base_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub consumer_key: Option<String>,
    #[serde(default)]
    pub consumer_secret: Option<String>,
}

fn default_food_search_url() -> String {
    DEFAULT_FOOD_SEARCH_URL.to_string()
}

fn default_max_results() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for FoodSearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_food_search_url(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
            consumer_key: None,
            consumer_secret: None,
        }
    }
}

impl FoodSearchConfig {
    /// Fill missing credentials from the conventional FatSecret variables.
    pub fn with_env_credentials(mut self) -> Self {
        let from_env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        if self.consumer_key.is_none() {
            self.consumer_key = from_env("FATSECRET_CONSUMER_KEY");
        }
        if self.consumer_secret.is_none() {
            self.consumer_secret = from_env("FATSECRET_CONSUMER_SECRET");
        }
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rotated log files; console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            models: ModelsConfig::default(),
            food_search: FoodSearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("models.preload", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("BODYECHO_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (BODYECHO_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("BODYECHO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.food_search = config.food_search.with_env_credentials();
        Ok(config)
    }
}

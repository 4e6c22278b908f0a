use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for FriendGraph
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FriendGraphConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where the edge store gets its data
    #[serde(default)]
    pub store: StoreConfig,

    /// Caller-side request settings
    #[serde(default)]
    pub query: QueryConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Edge store seeding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// JSON fixture with `users` and `friendships` arrays
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,

    /// Materialize the transpose of every accepted row while loading
    #[serde(default = "default_symmetrize")]
    pub symmetrize: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fixture_path: None,
            symmetrize: default_symmetrize(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryConfig {
    /// Upper bound on one facade request, enforced by the caller (0 = none)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_symmetrize() -> bool {
    true
}
fn default_request_timeout_ms() -> u64 {
    5_000
}

/// Configuration manager with file discovery and env overrides
pub struct ConfigManager {
    config: FriendGraphConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.friendgraph.toml)
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("Loaded configuration from {}", path.display()),
            None => info!("No config file found, using defaults"),
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load an explicit file, still honoring env overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::apply_env_overrides(Self::read_toml_file(path)?);
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".friendgraph.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .friendgraph.env: {}", e);
                }
            }
        }
    }

    /// Search order:
    /// 1. ./.friendgraph.toml
    /// 2. ~/.friendgraph/config.toml
    fn load_config_file() -> Result<(FriendGraphConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".friendgraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".friendgraph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((FriendGraphConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<FriendGraphConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(mut config: FriendGraphConfig) -> FriendGraphConfig {
        if let Ok(path) = std::env::var("FRIENDGRAPH_FIXTURE") {
            if !path.trim().is_empty() {
                config.store.fixture_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(symmetrize) = std::env::var("FRIENDGRAPH_SYMMETRIZE") {
            config.store.symmetrize = symmetrize.to_lowercase() == "true" || symmetrize == "1";
        }
        if let Ok(timeout) = std::env::var("FRIENDGRAPH_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                config.query.request_timeout_ms = ms;
            }
        }

        // Directive lists like "friendgraph=debug" are left for EnvFilter to read directly.
        if let Ok(level) = std::env::var("RUST_LOG") {
            let level = level.trim().to_lowercase();
            if matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
                config.logging.level = level;
            }
        }

        config
    }

    fn validate_config(config: &FriendGraphConfig) -> Result<(), ConfigError> {
        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &FriendGraphConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = FriendGraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            config: FriendGraphConfig::default(),
            config_path: None,
        }
    }
}

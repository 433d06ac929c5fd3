use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REGISTRY_URL: &str = "https://marketplace.tf/bots";
pub const DEFAULT_REMEDIATION_URL: &str = "https://marketplace.tf/blog/posts/YHLZOB";

/// Seven days
pub const DEFAULT_STALENESS_SECS: u64 = 604_800;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Page listing the official bots
    #[serde(default = "default_registry_url")]
    pub url: String,
    /// Age after which the cached registry is refetched
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,
    /// Timeout for the registry request in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Name fragments that claim to be the trusted operator (case-insensitive)
    #[serde(default = "default_trigger_phrases")]
    pub trigger_phrases: Vec<String>,
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_staleness_secs() -> u64 {
    DEFAULT_STALENESS_SECS
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_trigger_phrases() -> Vec<String> {
    vec![
        "marketplace.tf".to_string(),
        "marketplacetf".to_string(),
        "tfmarketplace".to_string(),
    ]
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            staleness_secs: default_staleness_secs(),
            request_timeout_ms: default_request_timeout_ms(),
            trigger_phrases: default_trigger_phrases(),
        }
    }
}

impl RegistryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Delay between sent-offer polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Stable polls before the user is told it is safe to confirm
    #[serde(default = "default_safe_after_polls")]
    pub safe_after_polls: u32,
    /// Consecutive poll fetch errors tolerated before the offer is treated as gone
    #[serde(default)]
    pub tolerated_fetch_errors: u32,
    /// Path appended to the profile URL to list sent offers
    #[serde(default = "default_sent_offers_path")]
    pub sent_offers_path: String,
    /// Cookie header for sent-offer requests. The listing is only served to
    /// the logged-in owner, anonymous polls see the login page.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

fn default_poll_interval_ms() -> u64 {
    4_000
}

fn default_safe_after_polls() -> u32 {
    3
}

fn default_sent_offers_path() -> String {
    "tradeoffers/sent/".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            safe_after_polls: default_safe_after_polls(),
            tolerated_fetch_errors: 0,
            sent_offers_path: default_sent_offers_path(),
            session_cookie: None,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    /// JSON file backing the key-value store. Defaults to the user data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("offerguard")
                .join("store.json")
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceConfig {
    /// Brand the trusted bots operate under, used in messages
    #[serde(default = "default_operator_name")]
    pub operator_name: String,
    /// Guidance linked from every danger message
    #[serde(default = "default_remediation_url")]
    pub remediation_url: String,
}

fn default_operator_name() -> String {
    "Marketplace.tf".to_string()
}

fn default_remediation_url() -> String {
    DEFAULT_REMEDIATION_URL.to_string()
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            operator_name: default_operator_name(),
            remediation_url: default_remediation_url(),
        }
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
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            monitor: MonitorConfig::default(),
            storage: StorageConfig::default(),
            surface: SurfaceConfig::default(),
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
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("monitor.poll_interval_ms", default_poll_interval_ms())?
            .set_default("registry.staleness_secs", DEFAULT_STALENESS_SECS)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("OFFERGUARD_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Untracked machine-local overrides (session cookie etc.)
            .add_source(File::from(config_dir.join("local")).required(false))
            // Override with environment variables (OFFERGUARD_REGISTRY__URL, etc.)
            .add_source(
                Environment::with_prefix("OFFERGUARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if url::Url::parse(&self.registry.url).is_err() {
            errors.push(format!("registry.url is not a valid URL: {}", self.registry.url));
        }

        if self.registry.staleness_secs == 0 {
            errors.push("registry.staleness_secs must be positive".to_string());
        }

        if self.registry.request_timeout_ms == 0 {
            errors.push("registry.request_timeout_ms must be positive".to_string());
        }

        if self
            .registry
            .trigger_phrases
            .iter()
            .all(|p| p.trim().is_empty())
        {
            errors.push("registry.trigger_phrases must contain at least one phrase".to_string());
        }

        if self.monitor.poll_interval_ms == 0 {
            errors.push("monitor.poll_interval_ms must be positive".to_string());
        }

        if self.monitor.safe_after_polls == 0 {
            errors.push("monitor.safe_after_polls must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

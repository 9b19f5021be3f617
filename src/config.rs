use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Remote recipe catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Local favourites/preferences store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Configuration for the remote recipe catalog
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Base URL for the catalog API (override for proxies or tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Static API key (can also be set via SPOONACULAR_API_KEY)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Ask the catalog to include cooking time and similar fields in search results
    #[serde(default = "default_add_recipe_information")]
    pub add_recipe_information: bool,
    /// Number of results requested per search
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout: default_timeout(),
            add_recipe_information: default_add_recipe_information(),
            results_per_page: default_results_per_page(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// API key from configuration, falling back to the environment
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("SPOONACULAR_API_KEY").ok())
    }
}

/// Configuration for the local key-value store
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding favourites and preferences
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://api.spoonacular.com".to_string()
}

fn default_timeout() -> u64 {
    20
}

fn default_add_recipe_information() -> bool {
    true
}

fn default_results_per_page() -> u32 {
    10
}

fn default_store_path() -> PathBuf {
    PathBuf::from("recipe_finder_store.json")
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_FINDER__ prefix
    /// 2. recipe_finder.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_FINDER__CATALOG__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe_finder").required(false))
        // Use double underscore for nested: RECIPE_FINDER__CATALOG__TIMEOUT
        .add_source(
            Environment::with_prefix("RECIPE_FINDER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::{Cuisine, Diet};

/// Which deployment of the recipe service to talk to
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    /// Service running on the developer's machine
    #[default]
    Local,
    /// Hosted service
    Production,
}

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Selects between the local and production endpoints
    #[serde(default)]
    pub environment: Deployment,
    /// Explicit service URL; takes precedence over `environment`
    pub base_url: Option<String>,
    /// Base URLs per deployment
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Where preferences and saved recipes live
    #[serde(default)]
    pub storage: StorageConfig,
    /// Where exported documents are written
    #[serde(default)]
    pub export: ExportConfig,
    /// Initial form values
    #[serde(default)]
    pub defaults: FormDefaults,
}

/// Base URLs of the recipe service
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    #[serde(default = "default_local_endpoint")]
    pub local: String,
    #[serde(default = "default_production_endpoint")]
    pub production: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            local: default_local_endpoint(),
            production: default_production_endpoint(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding preferences and saved recipes
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormDefaults {
    #[serde(default)]
    pub cuisine: Cuisine,
    #[serde(default)]
    pub diet: Diet,
    #[serde(default = "default_servings")]
    pub servings: u32,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            cuisine: Cuisine::default(),
            diet: Diet::default(),
            servings: default_servings(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Deployment::default(),
            base_url: None,
            endpoints: EndpointsConfig::default(),
            timeout: default_timeout(),
            storage: StorageConfig::default(),
            export: ExportConfig::default(),
            defaults: FormDefaults::default(),
        }
    }
}

// Default value functions
fn default_timeout() -> u64 {
    60
}

fn default_local_endpoint() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_production_endpoint() -> String {
    "https://your-backend-url.onrender.com".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("recipe-lab-store.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_servings() -> u32 {
    crate::input::DEFAULT_SERVINGS
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_LAB__ prefix
    /// 2. recipe-lab.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_LAB__ENDPOINTS__PRODUCTION
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// The service URL for this run, decided once at startup
    pub fn resolve_base_url(&self) -> &str {
        match (&self.base_url, self.environment) {
            (Some(url), _) if !url.trim().is_empty() => url,
            (_, Deployment::Local) => &self.endpoints.local,
            (_, Deployment::Production) => &self.endpoints.production,
        }
    }

    /// At least one second; a zero timeout would fail every request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    // Optional config file (can be missing)
    build_config(
        File::with_name("recipe-lab").required(false),
        environment(),
    )
}

/// Use double underscore for nested keys: RECIPE_LAB__EXPORT__OUTPUT_DIR
fn environment() -> Environment {
    Environment::with_prefix("RECIPE_LAB")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn build_config<F>(file: F, env: Environment) -> Result<AppConfig, ConfigError>
where
    F: Source + Send + Sync + 'static,
{
    Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?
        .try_deserialize()
}

//! Application configuration management.

use serde::Deserialize;

use crate::error::AppResult;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Bill document storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Default company record.
    #[serde(default)]
    pub company: CompanyConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Storage settings for uploaded bills.
///
/// `provider` selects which of the remaining fields are read:
/// `local` uses `root`, `s3` uses `endpoint`/`bucket`/keys/`region`,
/// `azure_blob` uses `account`/`access_key`/`bucket`, `memory` uses nothing.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Provider name: `local`, `s3`, `azure_blob` or `memory`.
    #[serde(default = "default_storage_provider")]
    pub provider: String,
    /// Root directory for the local provider.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// S3 endpoint URL.
    pub endpoint: Option<String>,
    /// Bucket (S3) or container (Azure) name.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// S3 access key ID.
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    pub secret_access_key: Option<String>,
    /// S3 region.
    pub region: Option<String>,
    /// Azure storage account name.
    pub account: Option<String>,
    /// Azure storage access key.
    pub access_key: Option<String>,
    /// Lifetime of temporary bill URLs in seconds.
    #[serde(default = "default_bill_url_ttl")]
    pub bill_url_ttl_secs: u64,
    /// Maximum bill size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            root: default_storage_root(),
            endpoint: None,
            bucket: default_bucket(),
            access_key_id: None,
            secret_access_key: None,
            region: None,
            account: None,
            access_key: None,
            bill_url_ttl_secs: default_bill_url_ttl(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_storage_provider() -> String {
    "local".to_string()
}

fn default_storage_root() -> String {
    "./storage".to_string()
}

fn default_bucket() -> String {
    "bills".to_string()
}

fn default_bill_url_ttl() -> u64 {
    600 // 10 minutes
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

/// Default company configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyConfig {
    /// Name of the single company record trucks are registered under.
    #[serde(default = "default_company_name")]
    pub default_name: String,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            default_name: default_company_name(),
        }
    }
}

fn default_company_name() -> String {
    "Logisco".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones: `config/default`,
    /// `config/{RUN_MODE}`, then `LOGISCO__SECTION__KEY` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LOGISCO").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

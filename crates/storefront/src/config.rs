//! Storefront configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `storefront.{toml,yaml,json}` file (or the path in `STOREFRONT_CONFIG`),
//! then `STOREFRONT__SECTION__KEY` environment variables.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use supply_chain_client::{defaults, ContractConfig, ContractError, ReceiptPolicy};
use thiserror::Error;

use crate::rate_limit::RateLimitConfig;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "STOREFRONT_CONFIG";

/// Errors raised while loading settings or starting up
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    #[error("Logging already initialised: {0}")]
    Logging(String),
}

/// Complete application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub chain: ChainSettings,
    pub logging: LoggingSettings,
    pub rate_limit: RateLimitConfig,
    pub metrics: MetricsSettings,
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Node endpoint and contract location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    pub rpc_url: String,
    pub contract_address: String,
    pub abi_path: PathBuf,
    /// Delay between receipt polls (milliseconds)
    pub receipt_poll_interval_ms: u64,
    /// Give up waiting for a receipt after this many seconds
    pub receipt_timeout_secs: u64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: defaults::RPC_URL.to_string(),
            contract_address: defaults::CONTRACT_ADDRESS.to_string(),
            abi_path: PathBuf::from(defaults::ABI_PATH),
            receipt_poll_interval_ms: 100,
            receipt_timeout_secs: 120,
        }
    }
}

impl ChainSettings {
    pub fn contract_config(&self) -> Result<ContractConfig, ContractError> {
        Ok(ContractConfig {
            rpc_url: self.rpc_url.clone(),
            address: self.contract_address.parse()?,
            abi_path: self.abi_path.clone(),
            receipt: ReceiptPolicy {
                poll_interval: Duration::from_millis(self.receipt_poll_interval_ms),
                timeout: Duration::from_secs(self.receipt_timeout_secs),
            },
        })
    }
}

/// Log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Prometheus exporter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Settings {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, SettingsError> {
        let file = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "storefront".to_string());
        Self::load_from(&file)
    }

    /// Load using `file` (extension optional, may be absent) and the environment
    pub fn load_from(file: &str) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("STOREFRONT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Environment variables are process-wide
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("storefront-{}-{}.toml", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let settings = Settings::load_from("does-not-exist").unwrap();
        assert_eq!(settings.server.bind_addr, "127.0.0.1:5000");
        assert_eq!(settings.chain.rpc_url, "http://127.0.0.1:8545/");
        assert_eq!(settings.chain.abi_path, PathBuf::from("SupplyChain.json"));
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.rate_limit.enabled);
        assert!(settings.metrics.enabled);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = write_config(
            "file",
            "[chain]\nrpc_url = \"http://node:8545\"\nreceipt_timeout_secs = 5\n[logging]\njson = true\n",
        );

        let settings = Settings::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.chain.rpc_url, "http://node:8545");
        assert_eq!(settings.chain.receipt_timeout_secs, 5);
        assert_eq!(settings.chain.receipt_poll_interval_ms, 100);
        assert!(settings.logging.json);
    }

    #[test]
    fn test_environment_overrides_file() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = write_config(
            "env",
            "[chain]\nrpc_url = \"http://node:8545\"\nreceipt_timeout_secs = 5\n",
        );

        std::env::set_var("STOREFRONT__CHAIN__RPC_URL", "http://env:8545");
        std::env::set_var("STOREFRONT__SERVER__BIND_ADDR", "0.0.0.0:8080");
        let settings = Settings::load_from(path.to_str().unwrap());
        std::env::remove_var("STOREFRONT__CHAIN__RPC_URL");
        std::env::remove_var("STOREFRONT__SERVER__BIND_ADDR");
        std::fs::remove_file(&path).ok();
        let settings = settings.unwrap();

        assert_eq!(settings.chain.rpc_url, "http://env:8545");
        assert_eq!(settings.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.chain.receipt_timeout_secs, 5);
        assert_eq!(settings.chain.receipt_poll_interval_ms, 100);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_contract_config() {
        let chain = ChainSettings::default();
        let contract = chain.contract_config().unwrap();
        assert_eq!(
            contract.address.to_string(),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
        assert_eq!(contract.receipt.timeout, Duration::from_secs(120));

        let bad = ChainSettings {
            contract_address: "0x12".to_string(),
            ..Default::default()
        };
        assert!(bad.contract_config().is_err());
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chain::{SOLANA_MAINNET_RPC, TOKEN_PROGRAM_ID};
use crate::duration::deserialize_duration;
use crate::market_data::providers::coingecko::COINGECKO_API_BASE;
use crate::portfolio::{DEFAULT_NATIVE_PRICE_KEY, DEFAULT_REQUEST_TIMEOUT};

pub const CONFIG_FILE_NAME: &str = "walletfolio.toml";

fn default_rpc_url() -> String {
    SOLANA_MAINNET_RPC.to_string()
}

fn default_price_api_url() -> String {
    COINGECKO_API_BASE.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_allow_list() -> PathBuf {
    PathBuf::from("bluechip_tokens.json")
}

fn default_native_price_key() -> String {
    DEFAULT_NATIVE_PRICE_KEY.to_string()
}

fn default_token_programs() -> Vec<String> {
    vec![TOKEN_PROGRAM_ID.to_string()]
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// USD values are rounded to this many places when printed.
    pub currency_decimals: u32,

    /// If set, token quantities are rounded to this many places when printed.
    pub quantity_decimals: Option<u32>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_decimals: 2,
            quantity_decimals: None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Solana JSON-RPC endpoint.
    pub rpc_url: String,

    /// CoinGecko API root.
    pub price_api_url: String,

    /// Timeout for each node or price request, e.g. "30s".
    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub request_timeout: Duration,

    /// Token allow-list. If relative, resolved from the config file location.
    pub allow_list: PathBuf,

    /// CoinGecko id used to price the native balance.
    pub native_price_key: String,

    /// Token programs scanned for holdings, one node call each.
    pub token_programs: Vec<String>,

    pub display: DisplayConfig,
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&crate::duration::format_duration(*value))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            price_api_url: default_price_api_url(),
            request_timeout: default_request_timeout(),
            allow_list: default_allow_list(),
            native_price_key: default_native_price_key(),
            token_programs: default_token_programs(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn resolve_allow_list(&self, config_dir: &Path) -> PathBuf {
        if self.allow_list.is_absolute() {
            self.allow_list.clone()
        } else {
            config_dir.join(&self.allow_list)
        }
    }

    fn resolve(self, config_dir: &Path) -> ResolvedConfig {
        let allow_list = self.resolve_allow_list(config_dir);
        ResolvedConfig {
            rpc_url: self.rpc_url,
            price_api_url: self.price_api_url,
            request_timeout: self.request_timeout,
            allow_list,
            native_price_key: self.native_price_key,
            token_programs: self.token_programs,
            display: self.display,
        }
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub rpc_url: String,
    pub price_api_url: String,
    pub request_timeout: Duration,
    /// Absolute (or cwd-relative) path of the allow-list file.
    pub allow_list: PathBuf,
    pub native_price_key: String,
    pub token_programs: Vec<String>,
    pub display: DisplayConfig,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./walletfolio.toml` if it exists in current directory
/// 2. `~/.config/walletfolio/walletfolio.toml` (XDG config directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from(CONFIG_FILE_NAME);
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join("walletfolio").join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return candidate;
        }
    }

    local_config
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// The allow-list path is resolved relative to the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        Ok(Config::load(&config_path)?.resolve(config_dir))
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// Without a file, relative paths resolve from the directory the config
    /// file would have lived in.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }

        let config_path = if config_path.is_relative() {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        } else {
            config_path.to_path_buf()
        };

        let config_dir = config_path
            .parent()
            .context("Config path has no parent directory")?;

        Ok(Config::default().resolve(config_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rpc_url, "https://api.mainnet-beta.solana.com");
        assert_eq!(config.price_api_url, "https://api.coingecko.com/api/v3");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.native_price_key, "solana");
        assert_eq!(config.token_programs, vec![TOKEN_PROGRAM_ID.to_string()]);
        assert_eq!(config.display.currency_decimals, 2);
    }

    #[test]
    fn test_load_partial_config() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, r#"rpc_url = "http://localhost:8899""#)?;
        writeln!(file, r#"request_timeout = "5s""#)?;
        writeln!(file, r#"allow_list = "lists/tokens.json""#)?;
        writeln!(file, "[display]")?;
        writeln!(file, "quantity_decimals = 4")?;

        let config = ResolvedConfig::load(&path)?;
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.price_api_url, COINGECKO_API_BASE);
        assert_eq!(config.display.quantity_decimals, Some(4));
        assert_eq!(config.display.currency_decimals, 2);
        assert_eq!(
            config.allow_list,
            dir.path().canonicalize()?.join("lists/tokens.json")
        );
        Ok(())
    }

    #[test]
    fn test_invalid_timeout_is_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "request_timeout = \"soon\"\n")?;

        let err = ResolvedConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
        Ok(())
    }

    #[test]
    fn test_missing_file_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let config = ResolvedConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME))?;
        assert_eq!(config.allow_list, dir.path().join("bluechip_tokens.json"));
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        Ok(())
    }

    #[test]
    fn test_absolute_allow_list_is_kept() {
        let config = Config {
            allow_list: PathBuf::from("/etc/walletfolio/tokens.json"),
            ..Config::default()
        };
        let resolved = config.resolve(Path::new("/home/user"));
        assert_eq!(resolved.allow_list, PathBuf::from("/etc/walletfolio/tokens.json"));
    }

    #[test]
    fn test_config_serializes_timeout_as_string() -> Result<()> {
        let rendered = toml::to_string(&Config::default())?;
        assert!(rendered.contains(r#"request_timeout = "30s""#));
        Ok(())
    }
}

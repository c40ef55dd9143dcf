//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.casequery/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::gateway::assistants::DEFAULT_GATEWAY_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CaseQueryConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub storage_file: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub site_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_SITE_URL: &str = "https://law-search-tawny.vercel.app";
pub const DEFAULT_LOG_LEVEL: &str = "debug";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub gateway_url: String,
    /// None = use `~/.casequery/storage.json`.
    pub storage_file: Option<PathBuf>,
    pub log_level: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub bind_address: String,
    pub site_url: String,
}

/// Flags given on the command line. None = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub gateway_url: Option<String>,
    pub bind_address: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.casequery/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".casequery").join("config.toml"))
}

/// Load config from `~/.casequery/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CaseQueryConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CaseQueryConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CaseQueryConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(CaseQueryConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<CaseQueryConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: CaseQueryConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# CaseQuery Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# storage_file = "/home/me/.casequery/storage.json"
# log_level = "debug"                  # "error", "warn", "info", "debug", "trace"

# [gateway]
# base_url = "http://localhost:3000/api/assistants"   # Or CASEQUERY_GATEWAY_URL

# [openai]
# api_key = "sk-..."                   # Or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"
# model = "gpt-4o"

# [server]
# bind_address = "127.0.0.1:8080"
# site_url = "https://law-search-tawny.vercel.app"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &CaseQueryConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Gateway: CLI → env → config → default
    let gateway_url = cli
        .gateway_url
        .clone()
        .or_else(|| env("CASEQUERY_GATEWAY_URL"))
        .or_else(|| config.gateway.base_url.clone())
        .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());

    let storage_file = env("CASEQUERY_STORAGE_FILE")
        .or_else(|| config.general.storage_file.clone())
        .map(PathBuf::from);

    let log_level = env("CASEQUERY_LOG_LEVEL")
        .or_else(|| config.general.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    // OpenAI API key: env → config
    let openai_api_key = env("OPENAI_API_KEY").or_else(|| config.openai.api_key.clone());

    let openai_base_url = env("OPENAI_BASE_URL")
        .or_else(|| config.openai.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

    let openai_model = env("CASEQUERY_MODEL")
        .or_else(|| config.openai.model.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

    // Bind address: CLI → env → config → default
    let bind_address = cli
        .bind_address
        .clone()
        .or_else(|| env("CASEQUERY_BIND"))
        .or_else(|| config.server.bind_address.clone())
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

    let site_url = env("CASEQUERY_SITE_URL")
        .or_else(|| config.server.site_url.clone())
        .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

    ResolvedConfig {
        gateway_url,
        storage_file,
        log_level,
        openai_api_key,
        openai_base_url,
        openai_model,
        bind_address,
        site_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = CaseQueryConfig::default();
        assert!(config.gateway.base_url.is_none());
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = CaseQueryConfig {
            openai: OpenAiConfig {
                model: Some("gpt-4o-mini".to_string()),
                ..Default::default()
            },
            server: ServerConfig {
                site_url: Some("https://example.org".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.site_url, "https://example.org");
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = CaseQueryConfig {
            gateway: GatewayConfig {
                base_url: Some("http://config-gateway".to_string()),
            },
            server: ServerConfig {
                bind_address: Some("0.0.0.0:9000".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            gateway_url: Some("http://cli-gateway".to_string()),
            bind_address: Some("127.0.0.1:3001".to_string()),
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.gateway_url, "http://cli-gateway");
        assert_eq!(resolved.bind_address, "127.0.0.1:3001");
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
storage_file = "/tmp/casequery.json"
log_level = "info"

[gateway]
base_url = "http://localhost:3000/api/assistants"

[openai]
api_key = "sk-test-123"
model = "gpt-4o"

[server]
bind_address = "0.0.0.0:8080"
"#;
        let config: CaseQueryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level.as_deref(), Some("info"));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test-123"));
        assert_eq!(config.server.bind_address.as_deref(), Some("0.0.0.0:8080"));
        assert!(config.server.site_url.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[openai]
model = "my-model"
"#;
        let config: CaseQueryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.openai.model.as_deref(), Some("my-model"));
        assert!(config.gateway.base_url.is_none());
        assert!(config.general.storage_file.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("casequery-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[gateway\nbase_url = 3").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}

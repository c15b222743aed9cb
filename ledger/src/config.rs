//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tessera_authority::MAX_SIG_CHECK_DEPTH;
use tessera_types::{ChainParams, NetworkId};
use tessera_utils::LogFormat;

use crate::LedgerError;

/// Configuration of the transaction processor.
///
/// Can be loaded from a TOML file via [`LedgerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Which network's chain id and parameters to use.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Protocol parameters (derived from `network`, not read from TOML).
    #[serde(skip)]
    pub params: ChainParams,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum nesting of account authorities followed during signature checks.
    #[serde(default = "default_max_sig_check_depth")]
    pub max_sig_check_depth: u32,

    /// Whether virtual operations are collected and passed to observers.
    #[serde(default = "default_true")]
    pub enable_virtual_op_log: bool,

    /// Skip signature verification, for replaying already validated blocks.
    #[serde(default)]
    pub skip_signature_check: bool,
}

fn default_network() -> NetworkId {
    NetworkId::Live
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_sig_check_depth() -> u32 {
    MAX_SIG_CHECK_DEPTH
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LedgerConfig {
    /// Defaults for `network`, with its parameters.
    pub fn for_network(network: NetworkId) -> Self {
        Self {
            network,
            params: ChainParams::for_network(network),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LedgerError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        let mut config: Self = toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.params = ChainParams::for_network(config.network);
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            params: ChainParams::for_network(default_network()),
            log_format: default_log_format(),
            log_level: default_log_level(),
            max_sig_check_depth: default_max_sig_check_depth(),
            enable_virtual_op_log: default_true(),
            skip_signature_check: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = LedgerConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = LedgerConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.network, config.network);
        assert_eq!(parsed.max_sig_check_depth, config.max_sig_check_depth);
        assert_eq!(parsed.params, config.params);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = LedgerConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.network, NetworkId::Live);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.max_sig_check_depth, 2);
        assert!(config.enable_virtual_op_log);
        assert!(!config.skip_signature_check);
    }

    #[test]
    fn network_selects_params() {
        let toml = r#"
            network = "test"
            log_format = "json"
            skip_signature_check = true
        "#;
        let config = LedgerConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.params, ChainParams::test());
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.skip_signature_check);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tessera.toml");
        std::fs::write(&path, "network = \"test\"\nmax_sig_check_depth = 3\n").expect("write");
        let config = LedgerConfig::from_toml_file(&path).expect("should load");
        assert_eq!(config.network, NetworkId::Test);
        assert_eq!(config.max_sig_check_depth, 3);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = LedgerConfig::from_toml_file("/nonexistent/tessera.toml");
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }
}

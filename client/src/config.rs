//! Client configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fabkv_types::PeerAddress;
use fabkv_wallet::AppUser;

use crate::ClientError;

/// Everything [`KvClient::connect`](crate::KvClient::connect) needs.
///
/// Can be loaded from a TOML file via [`ClientConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Channel the contract is installed on.
    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// Name of the key-value contract.
    #[serde(default = "default_contract_id")]
    pub contract_id: String,

    /// Membership service provider id of the client organisation.
    #[serde(default = "default_msp_id")]
    pub msp_id: String,

    /// Directory-backed wallet.
    #[serde(default = "default_wallet_path")]
    pub wallet_path: PathBuf,

    /// Network topology descriptor (JSON, or TOML by extension).
    #[serde(default = "default_connection_profile")]
    pub connection_profile: PathBuf,

    /// Peers that must endorse every submitted transaction. Empty means the
    /// network's endorsement policy picks them.
    #[serde(default)]
    pub endorsing_peers: Vec<PeerAddress>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Application user provisioned into the wallet on first connect.
    #[serde(default = "default_app_user")]
    pub app_user: AppUser,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_channel_name() -> String {
    "mychannel".to_string()
}

fn default_contract_id() -> String {
    "kvstore".to_string()
}

fn default_msp_id() -> String {
    "Org1MSP".to_string()
}

fn default_wallet_path() -> PathBuf {
    PathBuf::from("./wallet")
}

fn default_connection_profile() -> PathBuf {
    PathBuf::from("./connection-org1.json")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_app_user() -> AppUser {
    AppUser::new("appUser", "./appUser/msp")
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ClientError> {
        toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            channel_name: default_channel_name(),
            contract_id: default_contract_id(),
            msp_id: default_msp_id(),
            wallet_path: default_wallet_path(),
            connection_profile: default_connection_profile(),
            endorsing_peers: Vec::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            app_user: default_app_user(),
        }
    }
}

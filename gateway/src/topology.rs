//! Network topology descriptor (connection profile).
//!
//! Describes organisations, peers and channels. Loaded from JSON or, when the
//! file ends in `.toml`, from TOML:
//!
//! ```json
//! {
//!   "name": "test-network-org1",
//!   "client": { "organization": "Org1", "timeout_secs": 30 },
//!   "organizations": { "Org1": { "mspid": "Org1MSP", "peers": ["peer0.org1.example.com"] } },
//!   "peers": { "peer0.org1.example.com": { "url": "http://localhost:7051" } },
//!   "channels": { "mychannel": { "peers": ["peer0.org1.example.com"], "contracts": ["kvstore"] } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use fabkv_types::PeerAddress;

use crate::GatewayError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTopology {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    pub client: ClientSection,

    #[serde(default)]
    pub organizations: BTreeMap<String, OrganizationConfig>,

    #[serde(default)]
    pub peers: BTreeMap<String, PeerConfig>,

    #[serde(default)]
    pub channels: BTreeMap<String, ChannelConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSection {
    /// Organisation the client belongs to.
    pub organization: String,

    /// Window for a transaction round-trip before it counts as timed out.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationConfig {
    #[serde(rename = "mspid")]
    pub msp_id: String,

    #[serde(default)]
    pub peers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub peers: Vec<String>,

    /// Contracts installed on the channel.
    #[serde(default)]
    pub contracts: Vec<String>,
}

/// A named peer and the URL it is reached at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerEndpoint {
    pub name: String,
    pub url: String,
}

fn default_timeout_secs() -> u64 {
    30
}

impl NetworkTopology {
    /// Load and validate a topology file. `.toml` files are parsed as TOML,
    /// anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, GatewayError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Topology(format!("cannot read {}: {e}", path.display()))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, GatewayError> {
        let topology: Self = serde_json::from_str(s)
            .map_err(|e| GatewayError::Topology(format!("invalid JSON topology: {e}")))?;
        topology.validate()?;
        Ok(topology)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, GatewayError> {
        let topology: Self = toml::from_str(s)
            .map_err(|e| GatewayError::Topology(format!("invalid TOML topology: {e}")))?;
        topology.validate()?;
        Ok(topology)
    }

    /// Check internal references: the client organisation exists and every
    /// peer named by an organisation or channel is declared.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if !self.organizations.contains_key(&self.client.organization) {
            return Err(GatewayError::Topology(format!(
                "client organization {} is not declared",
                self.client.organization
            )));
        }
        if self.client.timeout_secs == 0 {
            return Err(GatewayError::Topology("client timeout must be positive".into()));
        }
        let referenced = self
            .organizations
            .values()
            .flat_map(|o| o.peers.iter())
            .chain(self.channels.values().flat_map(|c| c.peers.iter()));
        for peer in referenced {
            if !self.peers.contains_key(peer) {
                return Err(GatewayError::Topology(format!(
                    "peer {peer} is referenced but not declared"
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_secs)
    }

    pub fn channel(&self, name: &str) -> Result<&ChannelConfig, GatewayError> {
        self.channels
            .get(name)
            .ok_or_else(|| GatewayError::ChannelNotFound(name.to_string()))
    }

    /// Fail unless `contract` is installed on `channel`.
    pub fn resolve_contract(&self, channel: &str, contract: &str) -> Result<(), GatewayError> {
        let config = self.channel(channel)?;
        if config.contracts.iter().any(|c| c == contract) {
            Ok(())
        } else {
            Err(GatewayError::ContractNotFound {
                channel: channel.to_string(),
                contract: contract.to_string(),
            })
        }
    }

    /// The organisation whose MSP id is `msp_id`.
    pub fn organization_for_msp(&self, msp_id: &str) -> Option<(&str, &OrganizationConfig)> {
        self.organizations
            .iter()
            .find(|(_, org)| org.msp_id == msp_id)
            .map(|(name, org)| (name.as_str(), org))
    }

    /// The peer of the `msp_id` organisation that receives this client's
    /// proposals on `channel`: its first peer that also joined the channel.
    pub fn gateway_peer(&self, msp_id: &str, channel: &str) -> Result<PeerEndpoint, GatewayError> {
        let channel_config = self.channel(channel)?;
        let (org_name, org) = self.organization_for_msp(msp_id).ok_or_else(|| {
            GatewayError::Topology(format!("no organization with MSP id {msp_id}"))
        })?;
        org.peers
            .iter()
            .find(|p| channel_config.peers.contains(p))
            .and_then(|name| self.endpoint(name))
            .ok_or_else(|| {
                GatewayError::Topology(format!(
                    "organization {org_name} has no peer on channel {channel}"
                ))
            })
    }

    /// Look a peer address up by its declared name, or by its host when the
    /// address carries a port.
    pub fn resolve_peer(&self, address: &PeerAddress) -> Option<PeerEndpoint> {
        self.endpoint(address.as_str())
            .or_else(|| self.endpoint(address.host()))
    }

    fn endpoint(&self, name: &str) -> Option<PeerEndpoint> {
        self.peers.get(name).map(|p| PeerEndpoint {
            name: name.to_string(),
            url: p.url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "name": "test-network-org1",
        "client": { "organization": "Org1" },
        "organizations": {
            "Org1": { "mspid": "Org1MSP", "peers": ["peer0.org1.example.com", "peer1.org1.example.com"] },
            "Org2": { "mspid": "Org2MSP", "peers": ["peer0.org2.example.com"] }
        },
        "peers": {
            "peer0.org1.example.com": { "url": "http://localhost:7051" },
            "peer1.org1.example.com": { "url": "http://localhost:8051" },
            "peer0.org2.example.com": { "url": "http://localhost:9051" }
        },
        "channels": {
            "mychannel": {
                "peers": ["peer1.org1.example.com", "peer0.org2.example.com"],
                "contracts": ["kvstore"]
            }
        }
    }"#;

    #[test]
    fn parses_json_with_defaults() {
        let topology = NetworkTopology::from_json_str(JSON).unwrap();
        assert_eq!(topology.timeout(), Duration::from_secs(30));
        assert_eq!(topology.organizations.len(), 2);
        assert!(topology.version.is_none());
    }

    #[test]
    fn channel_and_contract_resolution() {
        let topology = NetworkTopology::from_json_str(JSON).unwrap();
        assert!(topology.resolve_contract("mychannel", "kvstore").is_ok());
        assert!(matches!(
            topology.resolve_contract("otherchannel", "kvstore"),
            Err(GatewayError::ChannelNotFound(c)) if c == "otherchannel"
        ));
        assert!(matches!(
            topology.resolve_contract("mychannel", "marbles"),
            Err(GatewayError::ContractNotFound { .. })
        ));
    }

    #[test]
    fn gateway_peer_is_first_org_peer_on_channel() {
        let topology = NetworkTopology::from_json_str(JSON).unwrap();
        let peer = topology.gateway_peer("Org1MSP", "mychannel").unwrap();
        assert_eq!(peer.name, "peer1.org1.example.com");
        assert_eq!(peer.url, "http://localhost:8051");
        assert!(topology.gateway_peer("Org3MSP", "mychannel").is_err());
    }

    #[test]
    fn resolve_peer_by_name_or_host() {
        let topology = NetworkTopology::from_json_str(JSON).unwrap();
        let with_port = PeerAddress::new("peer0.org2.example.com:9051").unwrap();
        assert_eq!(
            topology.resolve_peer(&with_port).unwrap().url,
            "http://localhost:9051"
        );
        let unknown = PeerAddress::new("peer9.org9.example.com:7051").unwrap();
        assert!(topology.resolve_peer(&unknown).is_none());
    }

    #[test]
    fn undeclared_peer_is_rejected() {
        let json = r#"{
            "name": "broken",
            "client": { "organization": "Org1" },
            "organizations": { "Org1": { "mspid": "Org1MSP", "peers": ["ghost"] } }
        }"#;
        assert!(matches!(
            NetworkTopology::from_json_str(json),
            Err(GatewayError::Topology(msg)) if msg.contains("ghost")
        ));
    }

    #[test]
    fn loads_toml_by_extension() {
        let toml = r#"
            name = "toml-network"

            [client]
            organization = "Org1"
            timeout_secs = 5

            [organizations.Org1]
            mspid = "Org1MSP"
            peers = ["peer0"]

            [peers.peer0]
            url = "http://127.0.0.1:7051"

            [channels.mychannel]
            peers = ["peer0"]
            contracts = ["kvstore"]
        "#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connection.toml");
        std::fs::write(&path, toml).unwrap();

        let topology = NetworkTopology::from_file(&path).unwrap();
        assert_eq!(topology.name, "toml-network");
        assert_eq!(topology.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn missing_file_is_topology_error() {
        let err = NetworkTopology::from_file(Path::new("/nonexistent/connection.json")).unwrap_err();
        assert!(matches!(err, GatewayError::Topology(_)));
    }
}

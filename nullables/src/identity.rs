//! Deterministic identities and a small test network.
//!
//! Keys are derived from the label and MSP id, so the same fixture always
//! produces the same material.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ed25519_dalek::pkcs8::spki::der::Document;
use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::SigningKey;
use fabkv_gateway::NetworkTopology;
use fabkv_types::{Identity, PrivateKeyPem};
use sha2::{Digest, Sha256};

pub const TEST_CHANNEL: &str = "mychannel";
pub const TEST_CONTRACT: &str = "kvstore";
pub const TEST_MSP_ID: &str = "Org1MSP";

/// Two organisations, three peers, one channel with the `kvstore` contract.
const TEST_TOPOLOGY: &str = r#"{
    "name": "test-network-org1",
    "version": "1.0.0",
    "client": { "organization": "Org1", "timeout_secs": 30 },
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
            "peers": ["peer0.org1.example.com", "peer1.org1.example.com", "peer0.org2.example.com"],
            "contracts": ["kvstore"]
        }
    }
}"#;

pub fn test_topology() -> NetworkTopology {
    NetworkTopology::from_json_str(TEST_TOPOLOGY).unwrap()
}

/// Write the test topology as `connection-org1.json` under `dir`.
pub fn write_topology(dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join("connection-org1.json");
    fs::write(&path, TEST_TOPOLOGY)?;
    Ok(path)
}

/// Ed25519 credentials for one enrolled user.
pub struct TestIdentity {
    label: String,
    msp_id: String,
    key: SigningKey,
}

impl TestIdentity {
    pub fn new(label: &str, msp_id: &str) -> Self {
        let seed: [u8; 32] = Sha256::new()
            .chain_update(label.as_bytes())
            .chain_update([0u8])
            .chain_update(msp_id.as_bytes())
            .finalize()
            .into();
        Self {
            label: label.to_string(),
            msp_id: msp_id.to_string(),
            key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// PEM certificate stand-in: `SEQUENCE { SEQUENCE { INTEGER 2, spki } }`.
    ///
    /// Not a valid X.509 certificate, but it carries the public key the way
    /// one does, which is all the session checks.
    pub fn certificate_pem(&self) -> String {
        let spki = self.key.verifying_key().to_public_key_der().unwrap();
        let mut tbs = vec![0x02, 0x01, 0x02];
        tbs.extend_from_slice(spki.as_bytes());
        let der = der_sequence(der_sequence(tbs));
        Document::try_from(der)
            .unwrap()
            .to_pem("CERTIFICATE", LineEnding::LF)
            .unwrap()
    }

    /// PKCS#8 PEM private key.
    pub fn private_key_pem(&self) -> String {
        self.key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string()
    }

    pub fn identity(&self) -> Identity {
        Identity::new(
            self.label.as_str(),
            self.msp_id.as_str(),
            self.certificate_pem().into_bytes(),
            PrivateKeyPem::new(self.private_key_pem().into_bytes()),
        )
    }

    /// Lay the credentials out as an MSP directory under `root` and return
    /// its path: `msp/signcerts/cert.pem` and `msp/keystore/priv_sk`.
    pub fn write_msp_dir(&self, root: &Path) -> io::Result<PathBuf> {
        let msp = root.join("msp");
        fs::create_dir_all(msp.join("signcerts"))?;
        fs::create_dir_all(msp.join("keystore"))?;
        fs::write(msp.join("signcerts").join("cert.pem"), self.certificate_pem())?;
        fs::write(msp.join("keystore").join("priv_sk"), self.private_key_pem())?;
        Ok(msp)
    }
}

/// Short-form DER SEQUENCE; contents stay under 128 bytes here.
fn der_sequence(contents: Vec<u8>) -> Vec<u8> {
    let mut out = vec![0x30, contents.len() as u8];
    out.extend(contents);
    out
}

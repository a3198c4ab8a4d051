//! Transaction proposals and their signatures.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use fabkv_types::TransactionRequest;

use crate::GatewayError;

/// Length of the random nonce mixed into every transaction id.
pub const NONCE_LEN: usize = 24;

/// Who is proposing: MSP id plus PEM certificate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub msp_id: String,
    pub certificate: String,
}

/// An unsigned request to run one contract function on one channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub tx_id: String,
    /// Hex-encoded nonce.
    pub nonce: String,
    pub channel: String,
    pub contract: String,
    pub function: String,
    pub args: Vec<String>,
    pub creator: Creator,
}

impl Proposal {
    /// Build a proposal with a fresh random nonce.
    pub fn new(
        channel: &str,
        contract: &str,
        request: &TransactionRequest,
        creator: Creator,
    ) -> Result<Self, GatewayError> {
        let mut nonce = [0u8; NONCE_LEN];
        getrandom::getrandom(&mut nonce)
            .map_err(|e| GatewayError::Encoding(format!("nonce generation failed: {e}")))?;
        Ok(Self::with_nonce(channel, contract, request, creator, nonce))
    }

    pub fn with_nonce(
        channel: &str,
        contract: &str,
        request: &TransactionRequest,
        creator: Creator,
        nonce: [u8; NONCE_LEN],
    ) -> Self {
        Self {
            tx_id: compute_tx_id(&nonce, &creator),
            nonce: hex::encode(nonce),
            channel: channel.to_string(),
            contract: contract.to_string(),
            function: request.operation().name().to_string(),
            args: request.args().to_vec(),
            creator,
        }
    }

    /// Canonical bytes covered by the signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, GatewayError> {
        serde_json::to_vec(self).map_err(|e| GatewayError::Encoding(e.to_string()))
    }
}

/// `hex(sha256(nonce || msp_id || certificate))`
pub fn compute_tx_id(nonce: &[u8], creator: &Creator) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator.msp_id.as_bytes());
    hasher.update(creator.certificate.as_bytes());
    hex::encode(hasher.finalize())
}

/// A proposal plus the creator's signature over [`Proposal::signing_bytes`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedProposal {
    pub proposal: Proposal,
    /// Hex-encoded Ed25519 signature.
    pub signature: String,
}

impl SignedProposal {
    pub fn tx_id(&self) -> &str {
        &self.proposal.tx_id
    }

    pub fn function(&self) -> &str {
        &self.proposal.function
    }

    pub fn args(&self) -> &[String] {
        &self.proposal.args
    }
}

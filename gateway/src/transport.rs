//! The seam between a session and the wire.

use std::sync::Arc;

use async_trait::async_trait;
use fabkv_types::PeerAddress;
use thiserror::Error;

use crate::proposal::SignedProposal;
use crate::topology::{NetworkTopology, PeerEndpoint};
use crate::GatewayError;

/// Which peers must endorse a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndorsementTargets {
    /// Let the network's endorsement policy pick the peers.
    Discovery,
    /// Exactly these peers, in this order.
    Explicit(Vec<PeerAddress>),
}

impl EndorsementTargets {
    /// `Explicit` for a non-empty peer list, `Discovery` otherwise.
    pub fn from_peers(peers: &[PeerAddress]) -> Self {
        if peers.is_empty() {
            EndorsementTargets::Discovery
        } else {
            EndorsementTargets::Explicit(peers.to_vec())
        }
    }

    pub fn peers(&self) -> Option<&[PeerAddress]> {
        match self {
            EndorsementTargets::Discovery => None,
            EndorsementTargets::Explicit(peers) => Some(peers),
        }
    }
}

/// Failure reported by the ledger side of a transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerFault {
    /// Endorsement policy not satisfied or endorsers disagreed.
    #[error("endorsement failed: {0}")]
    Endorsement(String),

    /// No response within the network's window; the outcome is unknown.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The contract function returned an application error.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("{0} does not exist")]
    KeyNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The gateway peer could not be reached or answered garbage.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Sends signed proposals to the network.
///
/// Implementations must be safe for concurrent use: a session shares one
/// transport across every caller.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Endorse, order and commit; returns the contract's response payload.
    async fn submit(
        &self,
        proposal: &SignedProposal,
        targets: &EndorsementTargets,
    ) -> Result<Vec<u8>, LedgerFault>;

    /// Run against one peer's world state without ordering.
    async fn evaluate(&self, proposal: &SignedProposal) -> Result<Vec<u8>, LedgerFault>;

    /// Release connections. Called at most once per session.
    async fn close(&self) {}
}

/// What a connector needs to build a transport for one session.
#[derive(Clone, Debug)]
pub struct ChannelBinding {
    pub topology: Arc<NetworkTopology>,
    pub channel: String,
    pub contract: String,
    /// Peer that receives this client's proposals.
    pub gateway_peer: PeerEndpoint,
}

/// Opens transports.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    async fn connect(
        &self,
        binding: &ChannelBinding,
    ) -> Result<Arc<dyn LedgerTransport>, GatewayError>;
}

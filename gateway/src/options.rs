//! Parameters a session is opened with.

use fabkv_types::{Identity, PeerAddress};

/// Everything needed to bind an identity to a channel and contract.
///
/// Immutable once built; a [`crate::NetworkSession`] keeps its own copy.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    channel_name: String,
    contract_id: String,
    membership_id: String,
    identity: Identity,
    endorsing_peers: Vec<PeerAddress>,
}

impl SessionOptions {
    /// Options for `identity` on `channel_name`/`contract_id`, taking the
    /// membership id from the identity and using endorsement discovery.
    pub fn new(
        channel_name: impl Into<String>,
        contract_id: impl Into<String>,
        identity: Identity,
    ) -> Self {
        Self {
            channel_name: channel_name.into(),
            contract_id: contract_id.into(),
            membership_id: identity.msp_id().to_string(),
            identity,
            endorsing_peers: Vec::new(),
        }
    }

    pub fn with_membership_id(mut self, membership_id: impl Into<String>) -> Self {
        self.membership_id = membership_id.into();
        self
    }

    /// Restrict every submitted transaction to exactly these peers.
    pub fn with_endorsing_peers(mut self, peers: Vec<PeerAddress>) -> Self {
        self.endorsing_peers = peers;
        self
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    pub fn membership_id(&self) -> &str {
        &self.membership_id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn endorsing_peers(&self) -> &[PeerAddress] {
        &self.endorsing_peers
    }
}

//! Session establishment and lifecycle.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fabkv_types::TransactionRequest;

use crate::executor::TransactionExecutor;
use crate::options::SessionOptions;
use crate::proposal::{Proposal, SignedProposal};
use crate::signer::Signer;
use crate::topology::{NetworkTopology, PeerEndpoint};
use crate::transport::{ChannelBinding, LedgerConnector, LedgerTransport};
use crate::GatewayError;

/// An identity bound to one channel and one contract.
///
/// Everything a call needs is fixed at [`open`](Self::open), so `&self`
/// methods are safe to call concurrently from many tasks (wrap the session in
/// an `Arc` to share it). The owner must call [`close`](Self::close) to
/// release the connection; dropping an open session only logs a warning.
pub struct NetworkSession {
    options: SessionOptions,
    topology: Arc<NetworkTopology>,
    gateway_peer: PeerEndpoint,
    signer: Signer,
    transport: Arc<dyn LedgerTransport>,
    closed: AtomicBool,
}

impl NetworkSession {
    /// Load the topology at `topology_path` and open a session on it.
    pub async fn open(
        options: SessionOptions,
        topology_path: &Path,
        connector: &dyn LedgerConnector,
    ) -> Result<Self, GatewayError> {
        let topology = NetworkTopology::from_file(topology_path)?;
        Self::open_with_topology(options, topology, connector).await
    }

    pub async fn open_with_topology(
        options: SessionOptions,
        topology: NetworkTopology,
        connector: &dyn LedgerConnector,
    ) -> Result<Self, GatewayError> {
        topology.validate()?;

        let identity = options.identity();
        if identity.msp_id() != options.membership_id() {
            return Err(GatewayError::InvalidIdentity(format!(
                "identity {} belongs to {}, not {}",
                identity.label(),
                identity.msp_id(),
                options.membership_id()
            )));
        }
        if topology.organization_for_msp(options.membership_id()).is_none() {
            return Err(GatewayError::InvalidIdentity(format!(
                "membership id {} is not known to network {}",
                options.membership_id(),
                topology.name
            )));
        }

        topology.resolve_contract(options.channel_name(), options.contract_id())?;
        for peer in options.endorsing_peers() {
            if topology.resolve_peer(peer).is_none() {
                return Err(GatewayError::Topology(format!(
                    "endorsing peer {peer} is not declared in network {}",
                    topology.name
                )));
            }
        }
        let signer = Signer::from_identity(identity)?;
        let gateway_peer = topology.gateway_peer(options.membership_id(), options.channel_name())?;

        let topology = Arc::new(topology);
        let binding = ChannelBinding {
            topology: Arc::clone(&topology),
            channel: options.channel_name().to_string(),
            contract: options.contract_id().to_string(),
            gateway_peer: gateway_peer.clone(),
        };
        let transport = connector.connect(&binding).await?;

        tracing::info!(
            channel = options.channel_name(),
            contract = options.contract_id(),
            identity = identity.label(),
            gateway = %gateway_peer.name,
            endorsing_peers = options.endorsing_peers().len(),
            "ledger session opened"
        );

        Ok(Self {
            options,
            topology,
            gateway_peer,
            signer,
            transport,
            closed: AtomicBool::new(false),
        })
    }

    /// Release the connection. Calling it again does nothing.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.transport.close().await;
        tracing::info!(
            channel = self.options.channel_name(),
            contract = self.options.contract_id(),
            "ledger session closed"
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Submit/evaluate dispatch bound to this session.
    pub fn executor(&self) -> TransactionExecutor<'_> {
        TransactionExecutor::new(self)
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    pub fn gateway_peer(&self) -> &PeerEndpoint {
        &self.gateway_peer
    }

    pub(crate) fn ensure_open(&self) -> Result<(), GatewayError> {
        if self.is_closed() {
            Err(GatewayError::SessionClosed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn transport(&self) -> &dyn LedgerTransport {
        self.transport.as_ref()
    }

    /// Wrap a request in a proposal for this channel/contract and sign it.
    pub(crate) fn sign(&self, request: &TransactionRequest) -> Result<SignedProposal, GatewayError> {
        let proposal = Proposal::new(
            self.options.channel_name(),
            self.options.contract_id(),
            request,
            self.signer.creator().clone(),
        )?;
        let signature = self.signer.sign(&proposal.signing_bytes()?);
        Ok(SignedProposal {
            proposal,
            signature: hex::encode(signature),
        })
    }
}

impl Drop for NetworkSession {
    fn drop(&mut self) {
        if !self.is_closed() {
            tracing::warn!(
                channel = self.options.channel_name(),
                contract = self.options.contract_id(),
                "ledger session dropped without close()"
            );
        }
    }
}

impl std::fmt::Debug for NetworkSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkSession")
            .field("channel", &self.options.channel_name())
            .field("contract", &self.options.contract_id())
            .field("identity", &self.options.identity().label())
            .field("gateway_peer", &self.gateway_peer.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

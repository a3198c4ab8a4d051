//! Client-side gateway to a permissioned ledger network.
//!
//! A [`NetworkSession`] binds one wallet identity to one channel and one
//! contract of a network described by a [`NetworkTopology`]. The session's
//! [`TransactionExecutor`] turns validated requests into signed proposals and
//! routes them:
//! - mutating operations are *submitted* for endorsement and ordering, either
//!   to an explicit endorsing peer set or through endorsement-policy discovery
//! - read operations are *evaluated* against a single peer's world state
//!
//! The wire is behind [`LedgerTransport`] / [`LedgerConnector`]; the HTTP
//! implementation talks to a gateway peer's REST endpoint.

pub mod error;
pub mod executor;
pub mod http;
pub mod options;
pub mod proposal;
pub mod session;
pub mod signer;
pub mod topology;
pub mod transport;

pub use error::GatewayError;
pub use executor::TransactionExecutor;
pub use http::{HttpConnector, HttpTransport};
pub use options::SessionOptions;
pub use proposal::{Creator, Proposal, SignedProposal};
pub use session::NetworkSession;
pub use topology::{NetworkTopology, PeerEndpoint};
pub use transport::{ChannelBinding, EndorsementTargets, LedgerConnector, LedgerFault, LedgerTransport};

//! Fundamental types for fabkv.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identities, peer addresses, the ledger operation schema, and the error taxonomy.

pub mod error;
pub mod identity;
pub mod operation;
pub mod peer;

pub use error::{ErrorKind, SubmitOutcome, TypesError};
pub use identity::{Identity, PrivateKeyPem, X509_IDENTITY_TYPE};
pub use operation::{Operation, TransactionRequest};
pub use peer::PeerAddress;

//! Typed key-value store over a ledger contract.
//!
//! [`KvClient`] turns `set`/`get`/`delete` on serializable values into
//! `Set`/`Get`/`Delete` transactions: writes are submitted for endorsement
//! and commit, reads are evaluated on a single peer.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;

pub use client::KvClient;
pub use config::ClientConfig;
pub use error::ClientError;

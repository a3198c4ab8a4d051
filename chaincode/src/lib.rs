//! Ledger-side key-value contract.
//!
//! Runs inside a peer against its world state. Every key moves through
//! `absent -> present` (Set), `present -> present` (Set, overwrite),
//! `present -> absent` (Delete) and `absent -> absent` (Delete, no-op).

pub mod contract;
pub mod error;
pub mod state;

pub use contract::KvContract;
pub use error::ContractError;
pub use state::{MemoryState, WorldState};

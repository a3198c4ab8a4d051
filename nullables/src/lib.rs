//! Nullable infrastructure for deterministic testing.
//!
//! The wallet and the ledger transport sit behind traits
//! ([`IdentityStore`](fabkv_wallet::IdentityStore),
//! [`LedgerTransport`](fabkv_gateway::LedgerTransport)). This crate provides
//! in-memory implementations that:
//! - Behave like the real thing for the happy path
//! - Record every call for assertions
//! - Fail on demand
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod identity;
pub mod ledger;
pub mod wallet;

pub use identity::{test_topology, write_topology, TestIdentity, TEST_CHANNEL, TEST_CONTRACT, TEST_MSP_ID};
pub use ledger::{CallMode, NullConnector, NullLedger, RecordedCall};
pub use wallet::NullWallet;

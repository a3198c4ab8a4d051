//! Identity wallet for fabkv.
//!
//! Provides everything a client needs before it can talk to the ledger:
//! - The [`IdentityStore`] abstraction over named identities
//! - A directory-backed [`FileSystemWallet`]
//! - Provisioning of an identity from an MSP directory on disk

pub mod error;
pub mod filesystem;
pub mod provision;
pub mod store;

pub use error::{ProvisionError, WalletError};
pub use filesystem::FileSystemWallet;
pub use provision::{ensure_app_user, ensure_identity, read_identity_material, AppUser};
pub use store::IdentityStore;

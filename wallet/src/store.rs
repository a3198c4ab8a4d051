//! Identity storage trait.

use fabkv_types::Identity;

use crate::WalletError;

/// Persistent mapping from label to [`Identity`], at most one identity per label.
///
/// Implementations must be safe to share between threads. Check-then-write
/// sequences built on top of this trait (see [`crate::ensure_identity`]) are
/// not atomic; concurrent provisioning of the same label has to be
/// serialised by the caller.
pub trait IdentityStore: Send + Sync {
    fn exists(&self, label: &str) -> Result<bool, WalletError>;
    fn get(&self, label: &str) -> Result<Identity, WalletError>;
    /// Insert or replace the identity stored under `label`.
    fn put(&self, label: &str, identity: &Identity) -> Result<(), WalletError>;
    fn remove(&self, label: &str) -> Result<(), WalletError>;
    fn list(&self) -> Result<Vec<String>, WalletError>;
}

/// Reject labels that are empty or could escape a wallet directory.
pub fn validate_label(label: &str) -> Result<(), WalletError> {
    if label.is_empty()
        || label == "."
        || label == ".."
        || label.contains(['/', '\\', '\0'])
    {
        return Err(WalletError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

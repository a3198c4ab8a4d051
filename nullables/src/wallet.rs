//! Nullable wallet: thread-safe in-memory identity storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use fabkv_types::Identity;
use fabkv_wallet::store::validate_label;
use fabkv_wallet::{IdentityStore, WalletError};

/// An in-memory identity store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullWallet {
    identities: Mutex<HashMap<String, Identity>>,
    puts: AtomicUsize,
    fail_puts: AtomicBool,
}

impl NullWallet {
    pub fn new() -> Self {
        Self {
            identities: Mutex::new(HashMap::new()),
            puts: AtomicUsize::new(0),
            fail_puts: AtomicBool::new(false),
        }
    }

    /// A wallet that already holds `identity` under its own label.
    pub fn with_identity(identity: Identity) -> Self {
        let wallet = Self::new();
        wallet
            .identities
            .lock()
            .unwrap()
            .insert(identity.label().to_string(), identity);
        wallet
    }

    /// Number of successful `put` calls.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Make every following `put` fail.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

impl Default for NullWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for NullWallet {
    fn exists(&self, label: &str) -> Result<bool, WalletError> {
        validate_label(label)?;
        Ok(self.identities.lock().unwrap().contains_key(label))
    }

    fn get(&self, label: &str) -> Result<Identity, WalletError> {
        validate_label(label)?;
        self.identities
            .lock()
            .unwrap()
            .get(label)
            .cloned()
            .ok_or_else(|| WalletError::NotFound(label.to_string()))
    }

    fn put(&self, label: &str, identity: &Identity) -> Result<(), WalletError> {
        validate_label(label)?;
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(WalletError::Other(format!("put of {label} refused")));
        }
        self.identities
            .lock()
            .unwrap()
            .insert(label.to_string(), identity.relabeled(label));
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, label: &str) -> Result<(), WalletError> {
        validate_label(label)?;
        self.identities.lock().unwrap().remove(label);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, WalletError> {
        let mut labels: Vec<String> = self.identities.lock().unwrap().keys().cloned().collect();
        labels.sort();
        Ok(labels)
    }
}

//! Identity provisioning from MSP material on disk.
//!
//! An MSP directory produced by a certificate authority looks like:
//!
//! ```text
//! msp/
//!   signcerts/cert.pem    the enrolment certificate
//!   keystore/<anything>   exactly one private key file
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use fabkv_types::{Identity, PrivateKeyPem};
use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, WalletError};
use crate::store::IdentityStore;

const SIGNCERTS_DIR: &str = "signcerts";
const CERT_FILE: &str = "cert.pem";
const KEYSTORE_DIR: &str = "keystore";

/// An application user and the MSP directory holding its credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUser {
    pub name: String,
    pub msp_path: PathBuf,
}

impl AppUser {
    pub fn new(name: impl Into<String>, msp_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            msp_path: msp_path.into(),
        }
    }

    pub fn cert_path(&self) -> PathBuf {
        self.msp_path.join(SIGNCERTS_DIR).join(CERT_FILE)
    }

    pub fn key_dir(&self) -> PathBuf {
        self.msp_path.join(KEYSTORE_DIR)
    }
}

/// Return the identity stored under `label`, provisioning it from
/// `cert_path` and the single key file in `key_dir` if the store lacks it.
///
/// An identity already in the store is returned as stored; the certificate
/// and key files are not read again. The existence check and the write are
/// two separate store calls, so callers must not provision the same label
/// concurrently.
pub fn ensure_identity<S: IdentityStore + ?Sized>(
    store: &S,
    msp_id: &str,
    label: &str,
    cert_path: &Path,
    key_dir: &Path,
) -> Result<Identity, ProvisionError> {
    if label.is_empty() {
        return Err(ProvisionError::InvalidArgument(
            "identity label must not be empty".into(),
        ));
    }
    crate::store::validate_label(label)
        .map_err(|e| ProvisionError::InvalidArgument(e.to_string()))?;
    if msp_id.is_empty() {
        return Err(ProvisionError::InvalidArgument(
            "membership id must not be empty".into(),
        ));
    }

    let exists = store
        .exists(label)
        .map_err(|source| persist_failed(label, source))?;
    if exists {
        tracing::debug!(label, "identity already in wallet, reusing");
        return store
            .get(label)
            .map_err(|source| persist_failed(label, source));
    }

    let identity = read_identity_material(msp_id, label, cert_path, key_dir)?;
    store
        .put(label, &identity)
        .map_err(|source| persist_failed(label, source))?;

    tracing::info!(label, msp_id, "identity added to wallet");
    Ok(identity)
}

/// [`ensure_identity`] for an [`AppUser`] with the standard MSP layout.
pub fn ensure_app_user<S: IdentityStore + ?Sized>(
    store: &S,
    msp_id: &str,
    user: &AppUser,
) -> Result<Identity, ProvisionError> {
    ensure_identity(store, msp_id, &user.name, &user.cert_path(), &user.key_dir())
}

/// Read certificate and key bytes from disk and build an identity.
///
/// Does not touch any store.
pub fn read_identity_material(
    msp_id: &str,
    label: &str,
    cert_path: &Path,
    key_dir: &Path,
) -> Result<Identity, ProvisionError> {
    let certificate = read_file(cert_path)?;
    let key_path = single_key_file(key_dir)?;
    let private_key = read_file(&key_path)?;

    Ok(Identity::new(
        label,
        msp_id,
        certificate,
        PrivateKeyPem::new(private_key),
    ))
}

/// The keystore directory must hold exactly one entry: the private key.
fn single_key_file(key_dir: &Path) -> Result<PathBuf, ProvisionError> {
    let unreadable = |source| ProvisionError::Unreadable {
        path: key_dir.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(key_dir).map_err(unreadable)? {
        entries.push(entry.map_err(unreadable)?.path());
    }

    if entries.len() != 1 {
        return Err(ProvisionError::AmbiguousKeyMaterial {
            dir: key_dir.to_path_buf(),
            found: entries.len(),
        });
    }
    Ok(entries.remove(0))
}

fn read_file(path: &Path) -> Result<Vec<u8>, ProvisionError> {
    fs::read(path).map_err(|source| ProvisionError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn persist_failed(label: &str, source: WalletError) -> ProvisionError {
    ProvisionError::PersistFailed {
        label: label.to_string(),
        source,
    }
}

//! Directory-backed wallet.
//!
//! Each identity lives in its own `<label>.id` JSON file, using the layout of
//! the Fabric SDK file-system wallets so existing wallets can be reused:
//!
//! ```json
//! {
//!   "version": 1,
//!   "mspId": "Org1MSP",
//!   "type": "X.509",
//!   "credentials": { "certificate": "-----BEGIN CERTIFICATE-----...", "privateKey": "..." }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use fabkv_types::{Identity, PrivateKeyPem, X509_IDENTITY_TYPE};

use crate::error::WalletError;
use crate::store::{validate_label, IdentityStore};

const ID_FILE_EXTENSION: &str = "id";
const ID_FILE_VERSION: u32 = 1;

/// On-disk representation of one identity.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityFile {
    version: u32,
    msp_id: String,
    #[serde(rename = "type")]
    identity_type: String,
    credentials: Credentials,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credentials {
    certificate: String,
    private_key: String,
}

/// A wallet storing identities as files in a single directory.
#[derive(Clone, Debug)]
pub struct FileSystemWallet {
    dir: PathBuf,
}

impl FileSystemWallet {
    /// Open the wallet at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, WalletError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| WalletError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, label: &str) -> Result<PathBuf, WalletError> {
        validate_label(label)?;
        Ok(self.dir.join(format!("{label}.{ID_FILE_EXTENSION}")))
    }
}

impl IdentityStore for FileSystemWallet {
    fn exists(&self, label: &str) -> Result<bool, WalletError> {
        let path = self.path_for(label)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(source) => Err(WalletError::Io { path, source }),
        }
    }

    fn get(&self, label: &str) -> Result<Identity, WalletError> {
        let path = self.path_for(label)?;
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                return Err(WalletError::NotFound(label.to_string()))
            }
            Err(source) => return Err(WalletError::Io { path, source }),
        };
        let file: IdentityFile =
            serde_json::from_str(&json).map_err(|e| WalletError::Corrupt {
                path: path.clone(),
                reason: format!("invalid identity JSON: {e}"),
            })?;

        if file.version != ID_FILE_VERSION {
            return Err(WalletError::Corrupt {
                path,
                reason: format!("unsupported identity file version: {}", file.version),
            });
        }
        if file.identity_type != X509_IDENTITY_TYPE {
            return Err(WalletError::Corrupt {
                path,
                reason: format!("unsupported identity type: {}", file.identity_type),
            });
        }

        Ok(Identity::new(
            label,
            file.msp_id,
            file.credentials.certificate.into_bytes(),
            PrivateKeyPem::new(file.credentials.private_key.into_bytes()),
        ))
    }

    fn put(&self, label: &str, identity: &Identity) -> Result<(), WalletError> {
        let path = self.path_for(label)?;
        let certificate = String::from_utf8(identity.certificate().to_vec())
            .map_err(|_| WalletError::Other("certificate is not UTF-8 PEM".into()))?;
        let private_key = String::from_utf8(identity.private_key().as_bytes().to_vec())
            .map_err(|_| WalletError::Other("private key is not UTF-8 PEM".into()))?;

        let file = IdentityFile {
            version: ID_FILE_VERSION,
            msp_id: identity.msp_id().to_string(),
            identity_type: X509_IDENTITY_TYPE.to_string(),
            credentials: Credentials {
                certificate,
                private_key,
            },
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| WalletError::Other(format!("JSON serialization failed: {e}")))?;

        // Write-then-rename so readers never observe a partial file.
        let tmp = path.with_extension(format!("{ID_FILE_EXTENSION}.tmp"));
        fs::write(&tmp, json).map_err(|source| WalletError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| WalletError::Io { path, source })
    }

    fn remove(&self, label: &str) -> Result<(), WalletError> {
        let path = self.path_for(label)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(source) => Err(WalletError::Io { path, source }),
        }
    }

    fn list(&self) -> Result<Vec<String>, WalletError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| WalletError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut labels = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| WalletError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ID_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                labels.push(stem.to_string());
            }
        }
        labels.sort();
        Ok(labels)
    }
}

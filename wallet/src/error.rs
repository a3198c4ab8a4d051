use std::path::PathBuf;

use fabkv_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("identity not found: {0}")]
    NotFound(String),

    #[error("invalid identity label: {0:?}")]
    InvalidLabel(String),

    #[error("wallet I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt identity file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("{0}")]
    Other(String),
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::NotFound(_) => ErrorKind::IdentityNotFound,
            WalletError::InvalidLabel(_) => ErrorKind::InvalidArgument,
            _ => ErrorKind::IdentityPersistFailed,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("keystore {} must contain exactly one key file, found {found}", .dir.display())]
    AmbiguousKeyMaterial { dir: PathBuf, found: usize },

    #[error("cannot read identity material {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to persist identity {label:?}: {source}")]
    PersistFailed {
        label: String,
        #[source]
        source: WalletError,
    },
}

impl ProvisionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProvisionError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ProvisionError::AmbiguousKeyMaterial { .. } => ErrorKind::AmbiguousKeyMaterial,
            ProvisionError::Unreadable { .. } => ErrorKind::IdentityMaterialUnreadable,
            ProvisionError::PersistFailed { .. } => ErrorKind::IdentityPersistFailed,
        }
    }
}

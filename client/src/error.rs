use fabkv_gateway::GatewayError;
use fabkv_types::ErrorKind;
use fabkv_wallet::{ProvisionError, WalletError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("key must not be empty")]
    InvalidKey,

    #[error("cannot encode value for {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot decode value of {key}: {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Wallet(e) => e.kind(),
            ClientError::Provision(e) => e.kind(),
            ClientError::Gateway(e) => e.kind(),
            ClientError::InvalidKey => ErrorKind::InvalidArgument,
            ClientError::Serialization { .. } => ErrorKind::SerializationFailed,
            ClientError::Deserialization { .. } => ErrorKind::DeserializationFailed,
            ClientError::Config(_) => ErrorKind::Configuration,
        }
    }
}

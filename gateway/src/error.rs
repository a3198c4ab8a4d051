use fabkv_types::{ErrorKind, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("topology error: {0}")]
    Topology(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("contract {contract} not found on channel {channel}")]
    ContractNotFound { channel: String, contract: String },

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("proposal encoding failed: {0}")]
    Encoding(String),

    #[error("endorsement failed: {0}")]
    EndorsementFailed(String),

    #[error("transaction timed out: {0}")]
    TransactionTimeout(String),

    #[error("operation rejected: {0}")]
    OperationRejected(String),

    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("{0} does not exist")]
    KeyNotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("session is closed")]
    SessionClosed,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            GatewayError::Topology(_) => ErrorKind::Configuration,
            GatewayError::ChannelNotFound(_) => ErrorKind::ChannelNotFound,
            GatewayError::ContractNotFound { .. } => ErrorKind::ContractNotFound,
            GatewayError::InvalidIdentity(_) => ErrorKind::InvalidIdentity,
            GatewayError::Encoding(_) => ErrorKind::SerializationFailed,
            GatewayError::EndorsementFailed(_) => ErrorKind::EndorsementFailed,
            GatewayError::TransactionTimeout(_) => ErrorKind::TransactionTimeout,
            GatewayError::OperationRejected(_) => ErrorKind::OperationRejected,
            GatewayError::EvaluationFailed(_) => ErrorKind::EvaluationFailed,
            GatewayError::KeyNotFound(_) => ErrorKind::KeyNotFound,
            GatewayError::Transport(_) => ErrorKind::Transport,
            GatewayError::SessionClosed => ErrorKind::SessionClosed,
        }
    }
}

impl From<TypesError> for GatewayError {
    fn from(e: TypesError) -> Self {
        GatewayError::InvalidArgument(e.to_string())
    }
}

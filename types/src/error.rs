//! Error taxonomy shared across crates.

use thiserror::Error;

/// Errors raised while constructing fundamental values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{operation} expects {expected} argument(s), got {got}")]
    Arity {
        operation: &'static str,
        expected: usize,
        got: usize,
    },
}

impl TypesError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Flat classification of every failure fabkv can surface.
///
/// Each crate's error enum maps onto exactly one kind via `kind()`, so callers
/// can branch on the category without matching nested error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Empty key/value or malformed argument, at either layer.
    InvalidArgument,
    /// The keystore directory holds zero or several files.
    AmbiguousKeyMaterial,
    /// Certificate or key material could not be read from disk.
    IdentityMaterialUnreadable,
    /// The identity store failed to check, read, or write an identity.
    IdentityPersistFailed,
    /// The wallet holds no identity under the requested label.
    IdentityNotFound,
    /// Key material is unusable or does not match the certificate / membership.
    InvalidIdentity,
    /// Client configuration or network topology is unreadable or inconsistent.
    Configuration,
    ChannelNotFound,
    ContractNotFound,
    EndorsementFailed,
    TransactionTimeout,
    OperationRejected,
    EvaluationFailed,
    KeyNotFound,
    SerializationFailed,
    DeserializationFailed,
    /// Connection-level failure talking to the gateway peer.
    Transport,
    /// The session was closed before the call.
    SessionClosed,
}

/// What a failed `submit` says about the transaction's fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The transaction was never committed; retrying cannot double-apply it.
    NotCommitted,
    /// The transaction may or may not have been committed.
    Uncertain,
}

impl ErrorKind {
    /// Classify a `submit` failure of this kind.
    pub fn submit_outcome(self) -> SubmitOutcome {
        match self {
            ErrorKind::TransactionTimeout | ErrorKind::Transport => SubmitOutcome::Uncertain,
            _ => SubmitOutcome::NotCommitted,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::AmbiguousKeyMaterial => "ambiguous_key_material",
            ErrorKind::IdentityMaterialUnreadable => "identity_material_unreadable",
            ErrorKind::IdentityPersistFailed => "identity_persist_failed",
            ErrorKind::IdentityNotFound => "identity_not_found",
            ErrorKind::InvalidIdentity => "invalid_identity",
            ErrorKind::Configuration => "configuration",
            ErrorKind::ChannelNotFound => "channel_not_found",
            ErrorKind::ContractNotFound => "contract_not_found",
            ErrorKind::EndorsementFailed => "endorsement_failed",
            ErrorKind::TransactionTimeout => "transaction_timeout",
            ErrorKind::OperationRejected => "operation_rejected",
            ErrorKind::EvaluationFailed => "evaluation_failed",
            ErrorKind::KeyNotFound => "key_not_found",
            ErrorKind::SerializationFailed => "serialization_failed",
            ErrorKind::DeserializationFailed => "deserialization_failed",
            ErrorKind::Transport => "transport",
            ErrorKind::SessionClosed => "session_closed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

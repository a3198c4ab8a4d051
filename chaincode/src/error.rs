use fabkv_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("input param {0} is missing")]
    InvalidArgument(&'static str),

    #[error("{0} does not exist")]
    KeyNotFound(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    Arity {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{0} must be submitted, not evaluated")]
    ReadOnlyViolation(&'static str),

    #[error("world state error: {0}")]
    State(String),
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::KeyNotFound(_) => ErrorKind::KeyNotFound,
            ContractError::State(_) => ErrorKind::OperationRejected,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

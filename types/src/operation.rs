//! Ledger operation schema and validated transaction requests.
//!
//! The ledger-side contract exposes a fixed set of named functions. Each one
//! has a documented arity and either mutates world state (and must be
//! submitted for endorsement and ordering) or only reads it (and is evaluated
//! against a single peer).

use std::fmt;

use crate::error::TypesError;

/// A named function of the key-value contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// No-op bootstrap.
    InitLedger,
    /// `Set(key, value)`
    Set,
    /// `Get(key) -> value`
    Get,
    /// `Delete(key)`
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::InitLedger,
        Operation::Set,
        Operation::Get,
        Operation::Delete,
    ];

    /// Wire name of the contract function.
    pub fn name(self) -> &'static str {
        match self {
            Operation::InitLedger => "InitLedger",
            Operation::Set => "Set",
            Operation::Get => "Get",
            Operation::Delete => "Delete",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, TypesError> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| TypesError::UnknownOperation(name.to_string()))
    }

    /// Number of string arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Operation::InitLedger => 0,
            Operation::Set => 2,
            Operation::Get | Operation::Delete => 1,
        }
    }

    /// Whether the function changes world state.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Operation::Get)
    }

    /// Names of the positional arguments, for error messages.
    fn argument_names(self) -> &'static [&'static str] {
        match self {
            Operation::InitLedger => &[],
            Operation::Set => &["key", "value"],
            Operation::Get | Operation::Delete => &["key"],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation plus its ordered string arguments, checked against the
/// operation's arity and for empty arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    operation: Operation,
    args: Vec<String>,
}

impl TransactionRequest {
    pub fn new(operation: Operation, args: Vec<String>) -> Result<Self, TypesError> {
        if args.len() != operation.arity() {
            return Err(TypesError::Arity {
                operation: operation.name(),
                expected: operation.arity(),
                got: args.len(),
            });
        }
        if let Some(pos) = args.iter().position(|a| a.is_empty()) {
            return Err(TypesError::InvalidArgument(format!(
                "{}: {} must not be empty",
                operation,
                operation.argument_names()[pos]
            )));
        }
        Ok(Self { operation, args })
    }

    pub fn init_ledger() -> Self {
        Self {
            operation: Operation::InitLedger,
            args: Vec::new(),
        }
    }

    pub fn set(key: &str, value: impl Into<String>) -> Result<Self, TypesError> {
        Self::new(Operation::Set, vec![key.to_string(), value.into()])
    }

    pub fn get(key: &str) -> Result<Self, TypesError> {
        Self::new(Operation::Get, vec![key.to_string()])
    }

    pub fn delete(key: &str) -> Result<Self, TypesError> {
        Self::new(Operation::Delete, vec![key.to_string()])
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_parts(self) -> (Operation, Vec<String>) {
        (self.operation, self.args)
    }
}

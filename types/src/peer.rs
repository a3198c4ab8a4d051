//! Peer address type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// Address of a ledger peer, either a topology name (`peer0.org1.example.com`)
/// or a `host:port` endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerAddress(String);

impl PeerAddress {
    pub fn new(address: impl Into<String>) -> Result<Self, TypesError> {
        let address = address.into();
        if address.is_empty() {
            return Err(TypesError::InvalidArgument(
                "peer address must not be empty".into(),
            ));
        }
        if address.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidArgument(format!(
                "peer address contains whitespace: {address:?}"
            )));
        }
        Ok(Self(address))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host part, with any `:port` suffix removed.
    pub fn host(&self) -> &str {
        match self.0.rsplit_once(':') {
            Some((host, port)) if port.parse::<u16>().is_ok() => host,
            _ => &self.0,
        }
    }
}

impl TryFrom<String> for PeerAddress {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PeerAddress> for String {
    fn from(value: PeerAddress) -> Self {
        value.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PeerAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

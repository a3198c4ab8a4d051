//! X.509 identity records held in a wallet and bound to network sessions.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Identity type tag written alongside stored credentials.
pub const X509_IDENTITY_TYPE: &str = "X.509";

/// PEM-encoded private key bytes.
///
/// Zeroized on drop; `Debug` never prints the contents.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyPem(Vec<u8>);

impl PrivateKeyPem {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PrivateKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyPem(<redacted>)")
    }
}

/// A named certificate + private key pair bound to an organisation's
/// membership service provider (MSP) id.
///
/// Identities are immutable: construct one with [`Identity::new`] and read it
/// through the getters.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    label: String,
    msp_id: String,
    certificate: Vec<u8>,
    private_key: PrivateKeyPem,
}

impl Identity {
    pub fn new(
        label: impl Into<String>,
        msp_id: impl Into<String>,
        certificate: Vec<u8>,
        private_key: PrivateKeyPem,
    ) -> Self {
        Self {
            label: label.into(),
            msp_id: msp_id.into(),
            certificate,
            private_key,
        }
    }

    /// The display name this identity is stored under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Membership service provider id of the issuing organisation.
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// PEM-encoded X.509 certificate.
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    pub fn private_key(&self) -> &PrivateKeyPem {
        &self.private_key
    }

    /// Same credentials under a different label.
    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("label", &self.label)
            .field("msp_id", &self.msp_id)
            .field("certificate_len", &self.certificate.len())
            .field("private_key", &self.private_key)
            .finish()
    }
}

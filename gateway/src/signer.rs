//! Signing context derived from an identity's key material.
//!
//! Built once when a session opens; nothing else in the workspace touches
//! private key bytes.

use ed25519_dalek::pkcs8::spki::der::Document;
use ed25519_dalek::pkcs8::{DecodePrivateKey, EncodePublicKey};
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};

use fabkv_types::Identity;

use crate::proposal::Creator;
use crate::GatewayError;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";

pub struct Signer {
    key: SigningKey,
    creator: Creator,
}

impl Signer {
    /// Parse the PKCS#8 PEM private key and check that the certificate
    /// carries the matching public key.
    pub fn from_identity(identity: &Identity) -> Result<Self, GatewayError> {
        let key_pem = std::str::from_utf8(identity.private_key().as_bytes())
            .map_err(|_| GatewayError::InvalidIdentity("private key is not PEM text".into()))?;
        let key = SigningKey::from_pkcs8_pem(key_pem)
            .map_err(|e| GatewayError::InvalidIdentity(format!("unreadable private key: {e}")))?;

        let cert_pem = std::str::from_utf8(identity.certificate())
            .map_err(|_| GatewayError::InvalidIdentity("certificate is not PEM text".into()))?;
        let (label, cert_der) = Document::from_pem(cert_pem)
            .map_err(|e| GatewayError::InvalidIdentity(format!("unreadable certificate: {e}")))?;
        if label != CERTIFICATE_LABEL {
            return Err(GatewayError::InvalidIdentity(format!(
                "expected a {CERTIFICATE_LABEL} PEM block, found {label}"
            )));
        }

        if !certifies(cert_der.as_bytes(), &key.verifying_key())? {
            return Err(GatewayError::InvalidIdentity(format!(
                "private key of {} does not match its certificate",
                identity.label()
            )));
        }

        Ok(Self {
            key,
            creator: Creator {
                msp_id: identity.msp_id().to_string(),
                certificate: cert_pem.to_string(),
            },
        })
    }

    pub fn creator(&self) -> &Creator {
        &self.creator
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.key.sign(message).to_bytes()
    }
}

/// A certificate certifies a key when its DER contains the key's
/// SubjectPublicKeyInfo.
fn certifies(cert_der: &[u8], key: &VerifyingKey) -> Result<bool, GatewayError> {
    let spki = key
        .to_public_key_der()
        .map_err(|e| GatewayError::InvalidIdentity(format!("cannot encode public key: {e}")))?;
    let spki = spki.as_bytes();
    Ok(cert_der.len() >= spki.len() && cert_der.windows(spki.len()).any(|w| w == spki))
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("msp_id", &self.creator.msp_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
    use ed25519_dalek::pkcs8::EncodePrivateKey;
    use ed25519_dalek::Verifier;
    use fabkv_types::PrivateKeyPem;

    /// Minimal DER certificate stand-in: SEQUENCE { SEQUENCE { INTEGER 2, spki } }.
    fn cert_pem_for(key: &VerifyingKey) -> String {
        let spki = key.to_public_key_der().unwrap();
        let mut tbs = vec![0x02, 0x01, 0x02];
        tbs.extend_from_slice(spki.as_bytes());
        let mut inner = vec![0x30, tbs.len() as u8];
        inner.extend(tbs);
        let mut der = vec![0x30, inner.len() as u8];
        der.extend(inner);
        Document::try_from(der)
            .unwrap()
            .to_pem(CERTIFICATE_LABEL, LineEnding::LF)
            .unwrap()
    }

    fn identity(key_seed: u8, cert_seed: u8) -> Identity {
        let key = SigningKey::from_bytes(&[key_seed; 32]);
        let cert_key = SigningKey::from_bytes(&[cert_seed; 32]);
        let key_pem = key.to_pkcs8_pem(LineEnding::LF).unwrap();
        Identity::new(
            "appUser",
            "Org1MSP",
            cert_pem_for(&cert_key.verifying_key()).into_bytes(),
            PrivateKeyPem::new(key_pem.as_bytes().to_vec()),
        )
    }

    #[test]
    fn matching_material_signs() {
        let signer = Signer::from_identity(&identity(7, 7)).unwrap();
        assert_eq!(signer.creator().msp_id, "Org1MSP");
        assert!(signer.creator().certificate.starts_with("-----BEGIN CERTIFICATE-----"));

        let sig = ed25519_dalek::Signature::from_bytes(&signer.sign(b"proposal"));
        assert!(signer.verifying_key().verify(b"proposal", &sig).is_ok());
    }

    #[test]
    fn mismatched_certificate_rejected() {
        let err = Signer::from_identity(&identity(7, 8)).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidIdentity(msg) if msg.contains("does not match")));
    }

    #[test]
    fn garbage_key_rejected() {
        let good = identity(7, 7);
        let bad = Identity::new(
            good.label(),
            good.msp_id(),
            good.certificate().to_vec(),
            PrivateKeyPem::new(b"not a key".to_vec()),
        );
        assert!(matches!(
            Signer::from_identity(&bad),
            Err(GatewayError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn non_certificate_pem_rejected() {
        let good = identity(7, 7);
        let key = SigningKey::from_bytes(&[7; 32]);
        let spki_pem = key
            .verifying_key()
            .to_public_key_der()
            .unwrap()
            .to_pem("PUBLIC KEY", LineEnding::LF)
            .unwrap();
        let bad = Identity::new(
            good.label(),
            good.msp_id(),
            spki_pem.into_bytes(),
            good.private_key().clone(),
        );
        assert!(matches!(
            Signer::from_identity(&bad),
            Err(GatewayError::InvalidIdentity(msg)) if msg.contains("PUBLIC KEY")
        ));
    }
}

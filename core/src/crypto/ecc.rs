use p256::ecdsa::signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use p256::{PublicKey, SecretKey};
use rand::rngs::OsRng;

use super::{digest, pem_str, KeyPair, Signer};
use crate::errors::SigningError;
use crate::types::Algorithm;

pub(super) fn generate_key_pair() -> Result<KeyPair, SigningError> {
    let secret = SecretKey::random(&mut OsRng);

    let private_pem = secret
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| SigningError::Internal(format!("p256 private key encoding: {e}")))?;
    let public_pem = secret
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| SigningError::Internal(format!("p256 public key encoding: {e}")))?;

    Ok(KeyPair { private_key: private_pem.as_bytes().to_vec(), public_key: public_pem.into_bytes() })
}

pub(super) fn verify(public_key: &[u8], msg: &[u8], signature: &[u8]) -> Result<bool, SigningError> {
    let public = PublicKey::from_public_key_pem(pem_str(public_key)?)
        .map_err(|_| SigningError::SigningFailure("malformed p256 public key".into()))?;
    let signature = Signature::from_der(signature)
        .map_err(|_| SigningError::SigningFailure("malformed ecdsa signature".into()))?;
    let verifying_key = VerifyingKey::from(public);
    Ok(verifying_key.verify_prehash(&digest(msg), &signature).is_ok())
}

/// ECDSA P-256 signer. Signatures are randomized and DER encoded.
pub struct EcdsaSigner {
    key: SigningKey,
}

impl EcdsaSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Parse a PKCS#8 PEM private key.
    pub fn from_pkcs8_pem(private_key: &[u8]) -> Result<Self, SigningError> {
        let secret = SecretKey::from_pkcs8_pem(pem_str(private_key)?)
            .map_err(|_| SigningError::SigningFailure("malformed p256 private key".into()))?;
        Ok(Self::new(SigningKey::from(secret)))
    }
}

impl Signer for EcdsaSigner {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ecc
    }

    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, SigningError> {
        let signature: Signature = self
            .key
            .sign_prehash_with_rng(&mut OsRng, &digest(msg))
            .map_err(|e| SigningError::SigningFailure(format!("ecdsa: {e}")))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

use ::rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use ::rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use rand::rngs::OsRng;
use sha2::Sha256;

use super::{digest, pem_str, KeyPair, Signer};
use crate::errors::SigningError;
use crate::types::Algorithm;

/// Modulus size for freshly generated device keys.
pub const RSA_KEY_BITS: usize = 2048;

pub(super) fn generate_key_pair() -> Result<KeyPair, SigningError> {
    let private = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
        .map_err(|e| SigningError::Internal(format!("rsa key generation: {e}")))?;
    let public = RsaPublicKey::from(&private);

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| SigningError::Internal(format!("rsa private key encoding: {e}")))?;
    let public_pem = public
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| SigningError::Internal(format!("rsa public key encoding: {e}")))?;

    Ok(KeyPair { private_key: private_pem.as_bytes().to_vec(), public_key: public_pem.into_bytes() })
}

pub(super) fn verify(public_key: &[u8], msg: &[u8], signature: &[u8]) -> Result<bool, SigningError> {
    let public = RsaPublicKey::from_public_key_pem(pem_str(public_key)?)
        .map_err(|_| SigningError::SigningFailure("malformed rsa public key".into()))?;
    Ok(public.verify(Pkcs1v15Sign::new::<Sha256>(), &digest(msg), signature).is_ok())
}

/// RSA signer producing deterministic PKCS#1 v1.5 signatures over SHA-256.
pub struct RsaSigner {
    key: RsaPrivateKey,
}

impl RsaSigner {
    pub fn new(key: RsaPrivateKey) -> Self {
        Self { key }
    }

    /// Parse a PKCS#8 PEM private key.
    pub fn from_pkcs8_pem(private_key: &[u8]) -> Result<Self, SigningError> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem_str(private_key)?)
            .map_err(|_| SigningError::SigningFailure("malformed rsa private key".into()))?;
        Ok(Self::new(key))
    }
}

impl Signer for RsaSigner {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rsa
    }

    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &digest(msg))
            .map_err(|e| SigningError::SigningFailure(format!("rsa: {e}")))
    }
}

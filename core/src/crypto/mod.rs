//! Key material and signing for the supported device algorithms.
//!
//! - [`rsa`]: RSA-2048 key generation, PKCS#1 v1.5 signing over SHA-256
//! - [`ecc`]: P-256 key generation, randomized ECDSA over SHA-256 (DER)
//!
//! Keys travel as PEM: PKCS#8 for private keys, SPKI for public keys.
//! Algorithm dispatch is a closed enum; unknown tags are rejected with
//! [`SigningError::InvalidAlgorithm`] before any key is parsed or generated.

mod ecc;
mod rsa;

use sha2::{Digest, Sha256};

use crate::errors::SigningError;
use crate::types::Algorithm;

pub use ecc::EcdsaSigner;
pub use self::rsa::{RsaSigner, RSA_KEY_BITS};

/// Encoded key pair as produced by [`KeyGenerator::generate`].
#[derive(Clone)]
pub struct KeyPair {
    /// PKCS#8 PEM.
    pub private_key: Vec<u8>,
    /// SPKI PEM.
    pub public_key: Vec<u8>,
}

/// Stateless signer over a SHA-256 digest of the message.
pub trait Signer: Send + Sync {
    /// Algorithm this signer was built for.
    fn algorithm(&self) -> Algorithm;
    /// Hash `msg` and sign the digest.
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, SigningError>;
}

/// Signer for one of the supported algorithms.
pub enum DeviceSigner {
    Rsa(RsaSigner),
    Ecdsa(EcdsaSigner),
}

impl DeviceSigner {
    /// Parse `private_key` (PKCS#8 PEM) for the given algorithm.
    pub fn new(algorithm: Algorithm, private_key: &[u8]) -> Result<Self, SigningError> {
        match algorithm {
            Algorithm::Rsa => RsaSigner::from_pkcs8_pem(private_key).map(DeviceSigner::Rsa),
            Algorithm::Ecc => EcdsaSigner::from_pkcs8_pem(private_key).map(DeviceSigner::Ecdsa),
        }
    }

    /// Like [`DeviceSigner::new`], starting from a wire tag.
    pub fn from_tag(tag: &str, private_key: &[u8]) -> Result<Self, SigningError> {
        Self::new(tag.parse()?, private_key)
    }
}

impl Signer for DeviceSigner {
    fn algorithm(&self) -> Algorithm {
        match self {
            DeviceSigner::Rsa(_) => Algorithm::Rsa,
            DeviceSigner::Ecdsa(_) => Algorithm::Ecc,
        }
    }

    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, SigningError> {
        match self {
            DeviceSigner::Rsa(s) => s.sign(msg),
            DeviceSigner::Ecdsa(s) => s.sign(msg),
        }
    }
}

/// Produces fresh key pairs for one algorithm.
#[derive(Debug, Clone, Copy)]
pub struct KeyGenerator {
    algorithm: Algorithm,
}

impl KeyGenerator {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    pub fn for_tag(tag: &str) -> Result<Self, SigningError> {
        Ok(Self::new(tag.parse()?))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Generate a new, independent key pair. Nothing is cached between calls.
    pub fn generate(&self) -> Result<KeyPair, SigningError> {
        match self.algorithm {
            Algorithm::Rsa => self::rsa::generate_key_pair(),
            Algorithm::Ecc => ecc::generate_key_pair(),
        }
    }
}

impl Algorithm {
    /// Shorthand for `KeyGenerator::new(self).generate()`.
    pub fn generate_key_pair(self) -> Result<KeyPair, SigningError> {
        KeyGenerator::new(self).generate()
    }
}

/// Check `signature` over `msg` against an SPKI PEM public key.
///
/// Returns `Ok(false)` for a well-formed but non-matching signature and an
/// error when the key or signature cannot be decoded.
pub fn verify_signature(
    algorithm: Algorithm,
    public_key: &[u8],
    msg: &[u8],
    signature: &[u8],
) -> Result<bool, SigningError> {
    match algorithm {
        Algorithm::Rsa => self::rsa::verify(public_key, msg, signature),
        Algorithm::Ecc => ecc::verify(public_key, msg, signature),
    }
}

fn digest(msg: &[u8]) -> [u8; 32] {
    Sha256::digest(msg).into()
}

fn pem_str(bytes: &[u8]) -> Result<&str, SigningError> {
    std::str::from_utf8(bytes).map_err(|_| SigningError::SigningFailure("key is not valid PEM text".into()))
}

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::crypto::KeyPair;
use crate::errors::SigningError;

/// Signature algorithms a device can be issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// RSA-2048, PKCS#1 v1.5 signatures over SHA-256.
    #[serde(rename = "RSA")]
    Rsa,
    /// ECDSA on NIST P-256 over SHA-256, DER encoded.
    #[serde(rename = "ECC")]
    Ecc,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Rsa, Algorithm::Ecc];

    /// Wire tag for this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Rsa => "RSA",
            Algorithm::Ecc => "ECC",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = SigningError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "RSA" => Ok(Algorithm::Rsa),
            "ECC" => Ok(Algorithm::Ecc),
            other => Err(SigningError::InvalidAlgorithm(other.to_string())),
        }
    }
}

/// A registered signature device.
///
/// The private key never leaves this crate: it is skipped by serialization,
/// redacted in `Debug`, and has no public accessor.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub algorithm: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub signature_counter: u64,
    #[serde(skip)]
    pub last_signature: String,
    #[serde(skip)]
    pub(crate) private_key: Vec<u8>,
    #[serde(serialize_with = "serialize_pem")]
    pub public_key: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl Device {
    /// Build a fresh device at counter 0, seeded with the genesis signature.
    pub fn new(id: impl Into<String>, algorithm: Algorithm, label: Option<String>, keys: KeyPair) -> Self {
        let id = id.into();
        let last_signature = genesis_signature(&id);
        Self {
            id,
            algorithm,
            label,
            signature_counter: 0,
            last_signature,
            private_key: keys.private_key,
            public_key: keys.public_key,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("algorithm", &self.algorithm)
            .field("label", &self.label)
            .field("signature_counter", &self.signature_counter)
            .field("last_signature", &self.last_signature)
            .field("private_key", &"<redacted>")
            .field("public_key", &String::from_utf8_lossy(&self.public_key))
            .field("created_at", &self.created_at)
            .finish()
    }
}

fn serialize_pem<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// Outcome of one successful sign call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureResult {
    /// Unpadded base64 of the raw signature bytes.
    pub signature: String,
    /// The exact string that was hashed and signed.
    pub signed_data: String,
}

/// Seed value for a device's last signature before anything was signed.
pub fn genesis_signature(device_id: &str) -> String {
    B64.encode(device_id.as_bytes())
}

/// Encode raw signature bytes the way they are chained and returned.
pub fn encode_signature(raw: &[u8]) -> String {
    B64.encode(raw)
}

/// Decode a chained signature back into raw bytes.
pub fn decode_signature(encoded: &str) -> Option<Vec<u8>> {
    B64.decode(encoded.as_bytes()).ok()
}

/// Build the secured payload `<counter>_<data>_<previous signature>`.
pub fn secured_data(counter: u64, data: &str, previous_signature: &str) -> String {
    format!("{counter}_{data}_{previous_signature}")
}

/// Split a secured payload into `(counter, data, previous signature)`.
///
/// The counter ends at the first underscore and the previous signature starts
/// after the last one; base64 never contains `_`, so `data` may.
pub fn parse_secured_data(secured: &str) -> Option<(u64, &str, &str)> {
    let (counter, rest) = secured.split_once('_')?;
    let (data, previous) = rest.rsplit_once('_')?;
    let counter = counter.parse().ok()?;
    Some((counter, data, previous))
}

use thiserror::Error;

/// Errors that can arise while issuing devices or signing transactions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device already exists: {0}")]
    DeviceAlreadyExists(String),
    #[error("invalid algorithm: {0}")]
    InvalidAlgorithm(String),
    #[error("invalid device ID: {0}")]
    InvalidDeviceId(String),
    #[error("data to sign cannot be empty")]
    EmptyData,
    /// Key parsing or the cryptographic operation itself failed.
    #[error("signing failure: {0}")]
    SigningFailure(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors reported while auditing a device's signature chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("malformed signed data at position {0}")]
    Malformed(usize),
    #[error("counter gap at position {position}: expected {expected}, found {found}")]
    CounterGap { position: usize, expected: u64, found: u64 },
    #[error("previous signature mismatch at counter {0}")]
    PreviousSignatureMismatch(u64),
    #[error("invalid signature at counter {0}")]
    InvalidSignature(u64),
}

//! chainsign core library: device issuance and chained transaction signing.
//!
//! - Per-device RSA-2048 or ECDSA P-256 key pairs, exchanged as PEM
//! - SHA-256 hashing, PKCS#1 v1.5 (RSA) or randomized DER ECDSA signatures
//! - Every signed payload is `<counter>_<data>_<previous signature>`, so each
//!   device's signatures form a tamper-evident chain
//! - Pluggable device registry with an atomic read-modify-write primitive
//!
//! Wire the pieces together by constructing one registry and sharing it:
//!
//! ```no_run
//! use std::sync::Arc;
//! use chainsign_core::{DeviceService, DeviceStore, InMemoryDeviceStore, NewDevice, TransactionService};
//!
//! let store: Arc<dyn DeviceStore> = Arc::new(InMemoryDeviceStore::new());
//! let devices = DeviceService::new(store.clone());
//! let transactions = TransactionService::new(store);
//!
//! devices.create_device(NewDevice { id: "d1".into(), algorithm: "ECC".into(), label: None })?;
//! let first = transactions.sign_transaction("d1", "A")?;
//! assert!(first.signed_data.starts_with("0_A_"));
//! # Ok::<(), chainsign_core::SigningError>(())
//! ```

pub mod chain;
pub mod crypto;
pub mod device;
pub mod errors;
pub mod registry;
pub mod traits;
pub mod transaction;
pub mod types;

pub use chain::verify_chain;
pub use crypto::{verify_signature, DeviceSigner, KeyGenerator, KeyPair, Signer};
pub use device::{DeviceService, NewDevice};
pub use errors::{ChainError, SigningError};
pub use registry::InMemoryDeviceStore;
pub use traits::{DeviceMutation, DeviceStore};
pub use transaction::TransactionService;
pub use types::{genesis_signature, secured_data, Algorithm, Device, SignatureResult};

/// Library version string.
pub fn version() -> &'static str { concat!("chainsign-core ", env!("CARGO_PKG_VERSION")) }

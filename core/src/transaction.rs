use std::sync::Arc;

use tracing::{debug, warn};

use crate::crypto::{DeviceSigner, Signer};
use crate::errors::SigningError;
use crate::traits::DeviceStore;
use crate::types::{encode_signature, secured_data, Device, SignatureResult};

/// Advances a device's signature chain one transaction at a time.
pub struct TransactionService {
    store: Arc<dyn DeviceStore>,
}

impl TransactionService {
    /// Create a new `TransactionService` over the given registry.
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    /// Sign `data` with the device's key, chaining it to the previous signature.
    ///
    /// Reading the counter and previous signature, signing, and committing the
    /// new chain head happen under the device's exclusive lock. Any failure
    /// leaves the device untouched, so the call can simply be retried.
    pub fn sign_transaction(&self, device_id: &str, data: &str) -> Result<SignatureResult, SigningError> {
        let mut result = None;
        self.store
            .update_atomic(device_id, &mut |device: &mut Device| {
                result = Some(advance_chain(device, data)?);
                Ok(())
            })
            .inspect_err(|e| warn!(device_id, error = %e, "transaction not signed"))?;

        result.ok_or_else(|| SigningError::Internal("registry committed without a signature".into()))
    }
}

fn advance_chain(device: &mut Device, data: &str) -> Result<SignatureResult, SigningError> {
    let counter = device.signature_counter;
    let next = counter
        .checked_add(1)
        .ok_or_else(|| SigningError::SigningFailure("signature counter exhausted".into()))?;

    let secured = secured_data(counter, data, &device.last_signature);
    let signer = DeviceSigner::new(device.algorithm, &device.private_key)?;
    let signature = encode_signature(&signer.sign(secured.as_bytes())?);

    device.signature_counter = next;
    device.last_signature = signature.clone();
    debug!(device_id = %device.id, counter, "transaction signed");

    Ok(SignatureResult { signature, signed_data: secured })
}

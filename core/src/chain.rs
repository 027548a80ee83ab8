//! Audit of a device's signature chain.

use crate::crypto::verify_signature;
use crate::errors::ChainError;
use crate::types::{decode_signature, genesis_signature, parse_secured_data, Device, SignatureResult};

/// Check that `results`, ordered by counter and starting at the genesis, form
/// an unbroken chain for `device`.
///
/// Every link must carry the next counter, embed the signature of the link
/// before it (the genesis value for counter 0), and carry a signature that
/// verifies against the device's public key over exactly its signed data.
pub fn verify_chain(device: &Device, results: &[SignatureResult]) -> Result<(), ChainError> {
    let mut previous = genesis_signature(&device.id);

    for (position, result) in results.iter().enumerate() {
        let (counter, _data, embedded) =
            parse_secured_data(&result.signed_data).ok_or(ChainError::Malformed(position))?;

        let expected = position as u64;
        if counter != expected {
            return Err(ChainError::CounterGap { position, expected, found: counter });
        }
        if embedded != previous {
            return Err(ChainError::PreviousSignatureMismatch(counter));
        }

        let raw = decode_signature(&result.signature).ok_or(ChainError::InvalidSignature(counter))?;
        let valid = verify_signature(device.algorithm, &device.public_key, result.signed_data.as_bytes(), &raw)
            .unwrap_or(false);
        if !valid {
            return Err(ChainError::InvalidSignature(counter));
        }

        previous = result.signature.clone();
    }
    Ok(())
}

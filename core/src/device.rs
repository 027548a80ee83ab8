use std::sync::Arc;

use tracing::info;

use crate::crypto::KeyGenerator;
use crate::errors::SigningError;
use crate::traits::DeviceStore;
use crate::types::Device;

/// Request to issue a new signature device.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub id: String,
    /// Wire tag, e.g. `"RSA"` or `"ECC"`.
    pub algorithm: String,
    pub label: Option<String>,
}

/// Issues devices and exposes read access to the registry.
pub struct DeviceService {
    store: Arc<dyn DeviceStore>,
}

impl DeviceService {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    /// Generate key material for a new device and register it.
    ///
    /// The returned device carries the public key only.
    pub fn create_device(&self, request: NewDevice) -> Result<Device, SigningError> {
        if request.id.trim().is_empty() {
            return Err(SigningError::InvalidDeviceId(request.id));
        }
        let generator = KeyGenerator::for_tag(&request.algorithm)?;

        // Key generation is expensive; skip it for ids that are already taken.
        // `create` below remains the authority when two requests race.
        if self.store.get_by_id(&request.id).is_ok() {
            return Err(SigningError::DeviceAlreadyExists(request.id));
        }

        let keys = generator.generate()?;
        let device = Device::new(request.id, generator.algorithm(), request.label, keys);
        self.store.create(device.clone())?;

        info!(device_id = %device.id, algorithm = %device.algorithm, "device created");
        Ok(device)
    }

    pub fn get_device(&self, id: &str) -> Result<Device, SigningError> {
        self.store.get_by_id(id)
    }

    pub fn find_all(&self) -> Result<Vec<Device>, SigningError> {
        self.store.find_all()
    }
}

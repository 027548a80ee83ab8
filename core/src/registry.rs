use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::errors::SigningError;
use crate::traits::{DeviceMutation, DeviceStore};
use crate::types::Device;

/// In-memory device registry with one lock per device.
///
/// The map itself is only locked long enough to insert a device or clone out
/// the handle of an existing one, so updates on different devices never wait
/// on each other.
#[derive(Default)]
pub struct InMemoryDeviceStore {
    devices: DashMap<String, Arc<Mutex<Device>>>,
}

impl InMemoryDeviceStore {
    /// Create a new, empty registry.
    pub fn new() -> Self { Self { devices: DashMap::new() } }

    fn slot(&self, id: &str) -> Result<Arc<Mutex<Device>>, SigningError> {
        self.devices
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SigningError::DeviceNotFound(id.to_string()))
    }
}

// A guarded device is only ever overwritten after a mutation succeeded, so a
// lock poisoned by a panicking mutation still holds a consistent record.
fn lock(slot: &Mutex<Device>) -> MutexGuard<'_, Device> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DeviceStore for InMemoryDeviceStore {
    fn create(&self, device: Device) -> Result<(), SigningError> {
        match self.devices.entry(device.id.clone()) {
            Entry::Occupied(entry) => Err(SigningError::DeviceAlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(device_id = %device.id, algorithm = %device.algorithm, "device registered");
                entry.insert(Arc::new(Mutex::new(device)));
                Ok(())
            }
        }
    }

    fn get_by_id(&self, id: &str) -> Result<Device, SigningError> {
        let slot = self.slot(id)?;
        let device = lock(&slot).clone();
        Ok(device)
    }

    fn find_all(&self) -> Result<Vec<Device>, SigningError> {
        let slots: Vec<_> = self.devices.iter().map(|entry| Arc::clone(entry.value())).collect();
        Ok(slots.iter().map(|slot| lock(slot).clone()).collect())
    }

    fn update_atomic(&self, id: &str, mutate: &mut DeviceMutation<'_>) -> Result<(), SigningError> {
        let slot = self.slot(id)?;
        let mut current = lock(&slot);

        let mut draft = current.clone();
        mutate(&mut draft)?;

        // Only chain state is mutable; identity and keys are fixed at creation.
        current.signature_counter = draft.signature_counter;
        current.last_signature = draft.last_signature;
        Ok(())
    }

    fn len(&self) -> usize { self.devices.len() }
}

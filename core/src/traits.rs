use crate::errors::SigningError;
use crate::types::Device;

/// Mutation applied by [`DeviceStore::update_atomic`].
pub type DeviceMutation<'a> = dyn FnMut(&mut Device) -> Result<(), SigningError> + 'a;

/// Concurrency-safe storage of device records.
///
/// Implementations decide how to lock, but must guarantee that `create` is
/// atomic with its existence check and that two `update_atomic` calls on the
/// same device never run their mutations concurrently.
pub trait DeviceStore: Send + Sync {
    /// Insert a new device, failing with `DeviceAlreadyExists` if the id is taken.
    fn create(&self, device: Device) -> Result<(), SigningError>;
    /// Snapshot of one device.
    fn get_by_id(&self, id: &str) -> Result<Device, SigningError>;
    /// Point-in-time snapshots of all devices, in no particular order.
    fn find_all(&self) -> Result<Vec<Device>, SigningError>;
    /// Run `mutate` against an exclusive view of the device and commit its
    /// changes only if it returns `Ok`. On error nothing is changed and the
    /// error is returned as is.
    fn update_atomic(&self, id: &str, mutate: &mut DeviceMutation<'_>) -> Result<(), SigningError>;
    /// Number of registered devices.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
}

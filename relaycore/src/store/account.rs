use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::device::{Device, PRIMARY_ID};

/// An account and the devices linked to it. Exactly one device carries
/// the primary id; the owning storage layer serializes mutation, so no
/// locking happens here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    uuid: Uuid,
    number: String,
    devices: Vec<Device>,
}

impl Account {
    pub fn new(uuid: Uuid, number: String, devices: Vec<Device>) -> Self {
        Self {
            uuid,
            number,
            devices,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The account's phone number in international format (`+<digits>`).
    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, id: u8) -> Option<&Device> {
        self.devices.iter().find(|device| device.id() == id)
    }

    pub fn device_mut(&mut self, id: u8) -> Option<&mut Device> {
        self.devices.iter_mut().find(|device| device.id() == id)
    }

    pub fn primary_device(&self) -> Option<&Device> {
        self.device(PRIMARY_ID)
    }

    /// Adds a device, replacing any existing device with the same id.
    pub fn add_device(&mut self, device: Device) {
        self.devices.retain(|existing| existing.id() != device.id());
        self.devices.push(device);
    }

    pub fn remove_device(&mut self, id: u8) {
        self.devices.retain(|device| device.id() != id);
    }

    /// Locks every device's credential. Skips devices that are already
    /// locked; locking twice would corrupt the stored hash.
    pub fn lock_authentication_credentials(&mut self) {
        for device in &mut self.devices {
            if !device.has_locked_credentials() {
                device.lock_auth_token_hash();
            }
        }
    }

    /// An account is enabled when its primary device is.
    pub fn is_enabled(&self, now: DateTime<Utc>) -> bool {
        self.primary_device()
            .is_some_and(|device| device.is_enabled(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SaltedTokenHash;
    use crate::types::EcSignedPreKey;

    fn account_with_devices(ids: &[u8]) -> Account {
        let devices = ids
            .iter()
            .map(|&id| Device::new(id, SaltedTokenHash::generate_for("token")))
            .collect();
        Account::new(Uuid::new_v4(), "+15551234567".to_string(), devices)
    }

    #[test]
    fn test_primary_device_lookup() {
        let account = account_with_devices(&[2, 1, 3]);
        assert_eq!(account.primary_device().unwrap().id(), PRIMARY_ID);
        assert!(account.device(4).is_none());
    }

    #[test]
    fn test_add_device_replaces_same_id() {
        let mut account = account_with_devices(&[1, 2]);
        let mut replacement = Device::new(2, SaltedTokenHash::generate_for("fresh"));
        replacement.set_name(Some("new tablet".to_string()));
        account.add_device(replacement);

        assert_eq!(account.devices().len(), 2);
        assert_eq!(account.device(2).unwrap().name(), Some("new tablet"));
    }

    #[test]
    fn test_lock_authentication_credentials_is_idempotent() {
        let mut account = account_with_devices(&[1, 2]);
        account.lock_authentication_credentials();
        let hashes: Vec<String> = account
            .devices()
            .iter()
            .map(|d| d.auth_token_hash().hash().to_string())
            .collect();

        account.lock_authentication_credentials();

        for (device, hash) in account.devices().iter().zip(&hashes) {
            assert!(device.has_locked_credentials());
            assert_eq!(device.auth_token_hash().hash(), hash);
            assert!(!hash.starts_with("!!"));
        }
    }

    #[test]
    fn test_account_enabled_follows_primary_device() {
        let now = Utc::now();
        let mut account = account_with_devices(&[1, 2]);
        assert!(!account.is_enabled(now));

        let primary = account.device_mut(PRIMARY_ID).unwrap();
        primary.set_fetches_messages(true);
        primary.set_signed_pre_key(Some(EcSignedPreKey::new(1, vec![1; 33], vec![0; 64])));
        assert!(account.is_enabled(now));
    }
}

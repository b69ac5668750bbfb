use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{LOCKED_PREFIX, SaltedTokenHash};
use crate::types::{EcSignedPreKey, IdentityType};

pub const PRIMARY_ID: u8 = 1;
pub const MAXIMUM_DEVICE_ID: u8 = 127;
pub const MAX_REGISTRATION_ID: u32 = 0x3FFF;

/// Window after which a linked (non-primary) device that has not checked
/// in stops counting as enabled.
const LINKED_DEVICE_IDLE_DAYS: i64 = 30;

/// Named feature flags a client advertises at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    #[serde(default)]
    pub storage: bool,
    #[serde(default)]
    pub transfer: bool,
    #[serde(default)]
    pub pni: bool,
    #[serde(rename = "paymentActivation", default)]
    pub payment_activation: bool,
}

/// One client installation tied to an account.
///
/// The serialized field names are a storage contract shared with
/// existing device records; renames here are load-bearing.
///
/// All mutation goes through named operations rather than raw field
/// access so that the push-timestamp side effect and the credential
/// locking scheme hold at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    id: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "authToken")]
    auth_token: String,
    salt: String,
    #[serde(rename = "gcmId", default, skip_serializing_if = "Option::is_none")]
    gcm_id: Option<String>,
    #[serde(rename = "apnId", default, skip_serializing_if = "Option::is_none")]
    apn_id: Option<String>,
    #[serde(rename = "voipApnId", default, skip_serializing_if = "Option::is_none")]
    voip_apn_id: Option<String>,
    #[serde(rename = "pushTimestamp", default)]
    push_timestamp: i64,
    #[serde(rename = "uninstalledFeedback", default)]
    uninstalled_feedback: i64,
    #[serde(rename = "fetchesMessages", default)]
    fetches_messages: bool,
    #[serde(rename = "registrationId", default)]
    registration_id: u32,
    #[serde(
        rename = "pniRegistrationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pni_registration_id: Option<u32>,
    #[serde(
        rename = "signedPreKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    signed_pre_key: Option<EcSignedPreKey>,
    #[serde(
        rename = "pniSignedPreKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pni_signed_pre_key: Option<EcSignedPreKey>,
    #[serde(rename = "lastSeen", default)]
    last_seen: i64,
    #[serde(default)]
    created: i64,
    #[serde(rename = "userAgent", default, skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capabilities: Option<DeviceCapabilities>,
}

impl Device {
    /// Creates a device with the given id and credentials; every other
    /// field starts empty and is populated from the registration
    /// request via the named setters.
    pub fn new(id: u8, credentials: SaltedTokenHash) -> Self {
        Self {
            id,
            name: None,
            auth_token: credentials.hash().to_string(),
            salt: credentials.salt().to_string(),
            gcm_id: None,
            apn_id: None,
            voip_apn_id: None,
            push_timestamp: 0,
            uninstalled_feedback: 0,
            fetches_messages: false,
            registration_id: 0,
            pni_registration_id: None,
            signed_pre_key: None,
            pni_signed_pre_key: None,
            last_seen: 0,
            created: 0,
            user_agent: None,
            capabilities: None,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn is_primary(&self) -> bool {
        self.id == PRIMARY_ID
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn auth_token_hash(&self) -> SaltedTokenHash {
        SaltedTokenHash::new(self.auth_token.clone(), self.salt.clone())
    }

    /// Replaces the stored credential unconditionally. Hash format is
    /// the caller's responsibility.
    pub fn set_auth_token_hash(&mut self, credentials: SaltedTokenHash) {
        self.auth_token = credentials.hash().to_string();
        self.salt = credentials.salt().to_string();
    }

    /// Whether this device's credential has been locked. A locked
    /// credential is one whose hash starts with the reserved `!`
    /// prefix, which cannot appear in a legitimately generated hash.
    pub fn has_locked_credentials(&self) -> bool {
        self.auth_token.starts_with(LOCKED_PREFIX)
    }

    /// Locks the device by invalidating its credential: the `!` prefix
    /// is prepended to the hash and the salt is kept. One-way; the only
    /// recovery is a fresh credential through `set_auth_token_hash`.
    /// Callers must not lock an already locked device, so go through
    /// `Account::lock_authentication_credentials` rather than calling
    /// this directly.
    pub fn lock_auth_token_hash(&mut self) {
        self.auth_token.insert(0, LOCKED_PREFIX);
    }

    pub fn gcm_id(&self) -> Option<&str> {
        self.gcm_id.as_deref()
    }

    /// Sets the GCM push token. A non-null token stamps
    /// `push_timestamp` with the current time; clearing does not.
    pub fn set_gcm_id(&mut self, gcm_id: Option<String>) {
        let stamp = gcm_id.is_some();
        self.gcm_id = gcm_id;

        if stamp {
            self.push_timestamp = Utc::now().timestamp_millis();
        }
    }

    pub fn apn_id(&self) -> Option<&str> {
        self.apn_id.as_deref()
    }

    /// Sets the APN push token, with the same timestamp side effect as
    /// `set_gcm_id`.
    pub fn set_apn_id(&mut self, apn_id: Option<String>) {
        let stamp = apn_id.is_some();
        self.apn_id = apn_id;

        if stamp {
            self.push_timestamp = Utc::now().timestamp_millis();
        }
    }

    pub fn voip_apn_id(&self) -> Option<&str> {
        self.voip_apn_id.as_deref()
    }

    /// VoIP token updates deliberately carry no timestamp side effect.
    pub fn set_voip_apn_id(&mut self, voip_apn_id: Option<String>) {
        self.voip_apn_id = voip_apn_id;
    }

    pub fn push_timestamp(&self) -> i64 {
        self.push_timestamp
    }

    pub fn fetches_messages(&self) -> bool {
        self.fetches_messages
    }

    pub fn set_fetches_messages(&mut self, fetches_messages: bool) {
        self.fetches_messages = fetches_messages;
    }

    pub fn registration_id(&self) -> u32 {
        self.registration_id
    }

    pub fn set_registration_id(&mut self, registration_id: u32) {
        self.registration_id = registration_id;
    }

    pub fn pni_registration_id(&self) -> Option<u32> {
        self.pni_registration_id
    }

    pub fn set_pni_registration_id(&mut self, registration_id: u32) {
        self.pni_registration_id = Some(registration_id);
    }

    /// Returns the signed pre-key bound to the given identity type.
    pub fn signed_pre_key(&self, identity_type: IdentityType) -> Option<&EcSignedPreKey> {
        match identity_type {
            IdentityType::Aci => self.signed_pre_key.as_ref(),
            IdentityType::Pni => self.pni_signed_pre_key.as_ref(),
        }
    }

    pub fn set_signed_pre_key(&mut self, signed_pre_key: Option<EcSignedPreKey>) {
        self.signed_pre_key = signed_pre_key;
    }

    pub fn set_pni_signed_pre_key(&mut self, signed_pre_key: Option<EcSignedPreKey>) {
        self.pni_signed_pre_key = signed_pre_key;
    }

    pub fn last_seen(&self) -> i64 {
        self.last_seen
    }

    pub fn set_last_seen(&mut self, last_seen: i64) {
        self.last_seen = last_seen;
    }

    pub fn created(&self) -> i64 {
        self.created
    }

    pub fn set_created(&mut self, created: i64) {
        self.created = created;
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn set_user_agent(&mut self, user_agent: Option<String>) {
        self.user_agent = user_agent;
    }

    pub fn uninstalled_feedback_timestamp(&self) -> i64 {
        self.uninstalled_feedback
    }

    pub fn set_uninstalled_feedback_timestamp(&mut self, timestamp: i64) {
        self.uninstalled_feedback = timestamp;
    }

    pub fn capabilities(&self) -> Option<&DeviceCapabilities> {
        self.capabilities.as_ref()
    }

    pub fn set_capabilities(&mut self, capabilities: Option<DeviceCapabilities>) {
        self.capabilities = capabilities;
    }

    /// Derived, never stored. A device is enabled when it has a message
    /// channel (a push token or active polling) and an ACI signed
    /// pre-key; linked devices additionally must have been seen within
    /// the last 30 days of `now`. The evaluation instant is an explicit
    /// input so the predicate is reproducible.
    pub fn is_enabled(&self, now: DateTime<Utc>) -> bool {
        let has_channel = self.fetches_messages
            || self.apn_id.as_deref().is_some_and(|id| !id.is_empty())
            || self.gcm_id.as_deref().is_some_and(|id| !id.is_empty());
        let has_key = self.signed_pre_key.is_some();

        if self.id == PRIMARY_ID {
            has_channel && has_key
        } else {
            let idle_cutoff = now - TimeDelta::days(LINKED_DEVICE_IDLE_DAYS);
            has_channel && has_key && self.last_seen > idle_cutoff.timestamp_millis()
        }
    }
}

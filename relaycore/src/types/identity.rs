use serde::{Deserialize, Serialize};

/// Identity namespace a key or registration can be bound to.
///
/// ACI is the account identity; PNI is the phone-number identity, a
/// secondary namespace tied to the account's number. The set is closed:
/// every dispatch over it is an exhaustive match with no fallback arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdentityType {
    Aci,
    Pni,
}

pub mod auth;
pub mod store;
pub mod types;

pub use auth::SaltedTokenHash;
pub use store::{Account, Device, DeviceCapabilities};
pub use types::{EcSignedPreKey, IdentityType};

pub mod identity;
pub mod keys;

pub use identity::IdentityType;
pub use keys::EcSignedPreKey;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{
    ExternalServiceCredentialGenerator, ExternalServiceCredentials, HmacCredentialGenerator,
};
use crate::config::{ConfigError, DirectoryConfig};
use relaycore::store::Account;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("account number is not a +-prefixed decimal number: {0:?}")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Derives the stable pseudonymous directory username for an account:
/// the 16 uuid bytes followed by the big-endian E.164 number, standard
/// base64 encoded. Deterministic, so repeated issuance addresses the
/// same external identity.
///
/// A number without a `+`-prefixed decimal part fitting in 64 bits is
/// corrupted account data; the error propagates rather than being
/// recovered.
pub fn derive_username(uuid: &Uuid, e164: &str) -> Result<String> {
    let digits = e164
        .strip_prefix('+')
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| DirectoryError::InvalidNumber(e164.to_string()))?;
    let e164_as_long: u64 = digits
        .parse()
        .map_err(|_| DirectoryError::InvalidNumber(e164.to_string()))?;

    let mut uuid_and_number = Vec::with_capacity(24);
    uuid_and_number.extend_from_slice(uuid.as_bytes());
    uuid_and_number.extend_from_slice(&e164_as_long.to_be_bytes());

    Ok(BASE64.encode(uuid_and_number))
}

/// Issues directory auth tokens for authenticated accounts by handing
/// the derived username to an external credential generator. The
/// generator owns freshness and expiry of the credential payload.
pub struct DirectoryAuthIssuer<G> {
    generator: G,
}

impl<G: ExternalServiceCredentialGenerator> DirectoryAuthIssuer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn issue(&self, account: &Account) -> Result<ExternalServiceCredentials> {
        let username = derive_username(&account.uuid(), account.number())?;
        log::debug!("issuing directory auth credentials for {}", account.uuid());
        Ok(self.generator.generate_for(&username))
    }
}

impl DirectoryAuthIssuer<HmacCredentialGenerator> {
    /// Builds an issuer from configuration. A malformed shared secret
    /// fails here, at startup.
    pub fn from_config(config: &DirectoryConfig) -> std::result::Result<Self, ConfigError> {
        let secret = config.decode_shared_secret()?;
        Ok(Self::new(HmacCredentialGenerator::new(secret)))
    }
}

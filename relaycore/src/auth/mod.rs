use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Prefix marking a stored credential as locked. Generated hashes are
/// lowercase hex, so this character never appears in a legitimate hash.
pub const LOCKED_PREFIX: char = '!';

const SALT_LEN: usize = 16;

/// A salted hash of a client-held authentication token. The token itself
/// is never stored; verification recomputes the hash from the stored
/// salt and compares in constant time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltedTokenHash {
    hash: String,
    salt: String,
}

impl SaltedTokenHash {
    pub fn new(hash: String, salt: String) -> Self {
        Self { hash, salt }
    }

    /// Hashes a freshly issued token under a random salt.
    pub fn generate_for(token: &str) -> Self {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt_bytes);
        let salt = hex::encode(salt_bytes);
        let hash = Self::hash_of(&salt, token);
        Self { hash, salt }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn verify(&self, token: &str) -> bool {
        let computed = Self::hash_of(&self.salt, token);
        computed.as_bytes().ct_eq(self.hash.as_bytes()).into()
    }

    fn hash_of(salt: &str, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

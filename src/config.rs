use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("shared secret is not valid hex: {0}")]
    InvalidSharedSecret(#[from] hex::FromHexError),
}

/// Configuration for the directory client: a single hex-encoded secret
/// shared with the directory service. Decoding happens once at startup;
/// a malformed secret is fatal, not a request-time condition.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    #[serde(rename = "userAuthenticationTokenSharedSecret")]
    user_authentication_token_shared_secret: String,
}

impl DirectoryConfig {
    pub fn new(user_authentication_token_shared_secret: String) -> Self {
        Self {
            user_authentication_token_shared_secret,
        }
    }

    pub fn decode_shared_secret(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(hex::decode(&self.user_authentication_token_shared_secret)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_hex_secret() {
        let config = DirectoryConfig::new("cafebabe00".to_string());
        assert_eq!(
            config.decode_shared_secret().unwrap(),
            vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00]
        );
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert!(DirectoryConfig::new("not-hex".to_string())
            .decode_shared_secret()
            .is_err());
        assert!(DirectoryConfig::new("abc".to_string())
            .decode_shared_secret()
            .is_err());
    }
}

use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Bytes of HMAC output kept in a credential password.
const TRUNCATED_MAC_LEN: usize = 10;

/// A time-bound credential minted for a derived username and consumed
/// by an external service that shares the generator's secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalServiceCredentials {
    pub username: String,
    pub password: String,
}

/// Mints credentials for a username. Implementations are expected to
/// produce time-bound, independently verifiable credentials.
pub trait ExternalServiceCredentialGenerator {
    fn generate_for(&self, username: &str) -> ExternalServiceCredentials;
}

/// Generator backed by a shared secret: the password is
/// `<unix-seconds>:<truncated hex HMAC-SHA256>` over
/// `<username>:<unix-seconds>`, so the consuming service can verify it
/// with the same secret and reject stale timestamps.
pub struct HmacCredentialGenerator {
    key: Vec<u8>,
}

impl HmacCredentialGenerator {
    pub fn new(key: Vec<u8>) -> Self {
        Self { key }
    }

    pub fn generate_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> ExternalServiceCredentials {
        let timestamp = now.timestamp();
        let mac = self.truncated_hmac(&format!("{username}:{timestamp}"));

        ExternalServiceCredentials {
            username: username.to_string(),
            password: format!("{timestamp}:{mac}"),
        }
    }

    /// Checks a presented credential against the shared secret and a
    /// maximum age measured from `now`.
    pub fn validate_at(
        &self,
        credentials: &ExternalServiceCredentials,
        now: DateTime<Utc>,
        max_age: TimeDelta,
    ) -> bool {
        let Some((timestamp_part, mac_part)) = credentials.password.split_once(':') else {
            return false;
        };
        let Ok(timestamp) = timestamp_part.parse::<i64>() else {
            return false;
        };

        let age = now.timestamp() - timestamp;
        if age < 0 || age > max_age.num_seconds() {
            return false;
        }

        let expected = self.truncated_hmac(&format!("{}:{timestamp}", credentials.username));
        expected.as_bytes().ct_eq(mac_part.as_bytes()).into()
    }

    fn truncated_hmac(&self, data: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .expect("HMAC-SHA256 can accept any key size");
        mac.update(data.as_bytes());
        let digest = mac.finalize().into_bytes();
        hex::encode(&digest[..TRUNCATED_MAC_LEN])
    }
}

impl ExternalServiceCredentialGenerator for HmacCredentialGenerator {
    fn generate_for(&self, username: &str) -> ExternalServiceCredentials {
        self.generate_at(username, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> HmacCredentialGenerator {
        HmacCredentialGenerator::new(vec![0xAB; 32])
    }

    #[test]
    fn test_password_carries_timestamp_and_mac() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let credentials = generator().generate_at("user", now);

        assert_eq!(credentials.username, "user");
        let (timestamp, mac) = credentials.password.split_once(':').unwrap();
        assert_eq!(timestamp, "1700000000");
        assert_eq!(mac.len(), TRUNCATED_MAC_LEN * 2);
        assert!(mac.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_validate_accepts_fresh_credentials() {
        let now = Utc::now();
        let generator = generator();
        let credentials = generator.generate_at("user", now);

        assert!(generator.validate_at(&credentials, now, TimeDelta::days(1)));
        assert!(generator.validate_at(
            &credentials,
            now + TimeDelta::hours(23),
            TimeDelta::days(1)
        ));
    }

    #[test]
    fn test_validate_rejects_expired_and_future() {
        let now = Utc::now();
        let generator = generator();
        let credentials = generator.generate_at("user", now);

        assert!(!generator.validate_at(
            &credentials,
            now + TimeDelta::days(2),
            TimeDelta::days(1)
        ));
        assert!(!generator.validate_at(
            &credentials,
            now - TimeDelta::seconds(5),
            TimeDelta::days(1)
        ));
    }

    #[test]
    fn test_validate_rejects_tampering() {
        let now = Utc::now();
        let generator = generator();
        let mut credentials = generator.generate_at("user", now);
        credentials.username = "other-user".to_string();

        assert!(!generator.validate_at(&credentials, now, TimeDelta::days(1)));

        let other_key = HmacCredentialGenerator::new(vec![0xCD; 32]);
        let credentials = other_key.generate_at("user", now);
        assert!(!generator.validate_at(&credentials, now, TimeDelta::days(1)));
    }
}

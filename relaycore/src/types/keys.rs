use serde::{Deserialize, Serialize};

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// A signed elliptic-curve pre-key as uploaded by a client: the key id,
/// the public key, and the signature over it by the matching identity
/// key. Stored field names are fixed by existing device records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcSignedPreKey {
    #[serde(rename = "keyId")]
    key_id: u64,
    #[serde(rename = "publicKey", with = "base64_bytes")]
    public_key: Vec<u8>,
    #[serde(with = "base64_bytes")]
    signature: Vec<u8>,
}

impl EcSignedPreKey {
    pub fn new(key_id: u64, public_key: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            key_id,
            public_key,
            signature,
        }
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

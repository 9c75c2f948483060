use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A user-configured source. `url` is stored unproxied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFeed {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl CustomFeed {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            id: Self::generate_id(url),
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Short deterministic id derived from the feed URL
    pub fn generate_id(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..8].to_string()
    }
}

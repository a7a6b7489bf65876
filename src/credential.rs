use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long before the recorded expiry a credential is already treated as expired.
const EXPIRY_LEEWAY_SECS: i64 = 10;

/// `0001-01-01T00:00:00Z`, the zero time OAuth2 tooling writes for tokens
/// without an expiry.
const ZERO_EXPIRY_TIMESTAMP: i64 = -62_135_596_800;

/// Serializable OAuth credential for the music service.
///
/// This is the record kept in the token store between runs. Field names match
/// the usual OAuth2 token JSON so records written by other tools load as-is,
/// and fields this crate does not know about are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer secret sent with every API call
    pub access_token: String,
    /// Token kind, normally `Bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Secret exchanged for a new access token once it expires
    #[serde(default)]
    pub refresh_token: String,
    /// Instant after which the access token is no longer accepted
    pub expiry: DateTime<Utc>,
    /// Fields written by newer versions or other tools
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credential {
    /// Create a new credential with the provided state
    pub fn new(
        access_token: String,
        token_type: String,
        refresh_token: String,
        expiry: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            token_type,
            refresh_token,
            expiry,
            extra: serde_json::Map::new(),
        }
    }

    /// Build a credential from an `expires_in` seconds value relative to now.
    pub fn expiring_in(
        access_token: String,
        token_type: String,
        refresh_token: String,
        expires_in_secs: i64,
    ) -> Self {
        Self::new(
            access_token,
            token_type,
            refresh_token,
            Utc::now() + Duration::seconds(expires_in_secs),
        )
    }

    /// Whether the access token should be refreshed before use.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.never_expires() {
            return false;
        }
        self.expiry <= now + Duration::seconds(EXPIRY_LEEWAY_SECS)
    }

    /// Whether the record carries the zero expiry, meaning the access token
    /// is used until the service rejects it.
    pub fn never_expires(&self) -> bool {
        self.expiry.timestamp() == ZERO_EXPIRY_TIMESTAMP
    }

    /// Whether this credential can be refreshed without the user.
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        let kind = if self.token_type.is_empty() {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{kind} {}", self.access_token)
    }

    /// Serialize credential to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize credential from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

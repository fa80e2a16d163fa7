use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Role granted to the holder of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    Unknown,
    User,
    Admin,
}

impl Role {
    /// Map a server-supplied role string. Anything unrecognized is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unknown => "unknown",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::parse(s)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::parse(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::parse(s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bearer credential issued by the login exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token_type: String,
    pub token: String,
    /// Absolute expiry in epoch milliseconds
    pub expires_at: i64,
    pub role: Role,
}

impl Credential {
    pub fn new(
        token_type: impl Into<String>,
        token: impl Into<String>,
        expires_at: i64,
        role: Role,
    ) -> Self {
        Self {
            token_type: token_type.into(),
            token: token.into(),
            expires_at,
            role,
        }
    }

    /// Value for the `Authorization` header, e.g. `Bearer abc123`
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.token)
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }

    /// Check the expiry against the current time. Evaluated on every call.
    pub fn is_valid(&self) -> bool {
        let valid = self.is_valid_at(now_millis());
        debug!(
            expires_at = %self.expiry_display(),
            valid,
            "Checked auth token expiry"
        );
        valid
    }

    pub fn is_expired(&self) -> bool {
        !self.is_valid()
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.expires_at).single()
    }

    /// Remaining lifetime, zero once expired
    pub fn time_until_expiry(&self) -> Duration {
        Duration::milliseconds(self.expires_at.saturating_sub(now_millis()).max(0))
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes()
    }

    fn expiry_display(&self) -> String {
        match self.expires_at_utc() {
            Some(at) => at.to_rfc3339(),
            None => self.expires_at.to_string(),
        }
    }
}

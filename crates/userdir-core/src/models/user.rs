use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// User record as returned by the directory API.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    /// Unix seconds
    pub last_seen_at: Option<i64>,
    /// Unix seconds
    pub password_updated_at: Option<i64>,
    pub password: Option<String>,
}

impl UserResponse {
    /// Convert to a domain record. `email` and `last_seen_at` are mandatory.
    pub fn to_user(&self) -> Option<UserRecord> {
        let email = self.email.clone()?;
        let last_seen_at = unix_seconds(self.last_seen_at?)?;
        Some(UserRecord {
            email,
            name: self.name.clone().unwrap_or_default(),
            picture: self.picture.clone().unwrap_or_default(),
            last_seen_at,
            password_updated_at: self.password_updated_at.and_then(unix_seconds),
            password: self.password.clone().filter(|p| !p.is_empty()),
        })
    }
}

fn unix_seconds(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// A directory user, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub email: String,
    pub name: String,
    pub picture: String,
    pub last_seen_at: DateTime<Utc>,
    pub password_updated_at: Option<DateTime<Utc>>,
    /// One-time plaintext password, only present right after creation or renewal
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

impl UserRecord {
    /// Days since the password was last changed, rounded up.
    pub fn password_age_days(&self) -> Option<i64> {
        self.password_age_days_at(Utc::now())
    }

    fn password_age_days_at(&self, now: DateTime<Utc>) -> Option<i64> {
        let age_ms = (now - self.password_updated_at?).num_milliseconds();
        Some((age_ms + MILLIS_PER_DAY - 1).div_euclid(MILLIS_PER_DAY))
    }

    pub fn last_seen_display(&self) -> String {
        self.last_seen_at.format("%a %b %d %Y at %H:%M:%S").to_string()
    }
}

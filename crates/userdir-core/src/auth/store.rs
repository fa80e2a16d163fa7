use tracing::{debug, warn};

use super::credential::{Credential, Role};
use super::storage::KeyValueStore;

const TOKEN_KEY: &str = "token";
const TOKEN_TYPE_KEY: &str = "token_type";
const TOKEN_EXPIRES_AT_KEY: &str = "token_expires_at";
const TOKEN_ROLE_KEY: &str = "token_role";

const ALL_KEYS: [&str; 4] = [TOKEN_KEY, TOKEN_TYPE_KEY, TOKEN_EXPIRES_AT_KEY, TOKEN_ROLE_KEY];

/// Maps a `Credential` to and from four entries of a key/value backend.
///
/// An expired or incomplete credential is never handed back by `load()`.
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Restore the persisted credential, if one exists and is still valid.
    pub fn load(&self) -> Option<Credential> {
        let token = self.read(TOKEN_KEY)?;
        let token_type = self.read(TOKEN_TYPE_KEY)?;
        let expires_raw = self.read(TOKEN_EXPIRES_AT_KEY)?;

        let Some(expires_at) = parse_expiry(&expires_raw) else {
            warn!(value = %expires_raw, "Stored token expiry is not a timestamp, clearing session");
            self.clear();
            return None;
        };

        // Sessions saved before roles were tracked have no role entry
        let role = self
            .read(TOKEN_ROLE_KEY)
            .map(|r| Role::parse(&r))
            .unwrap_or_default();

        let credential = Credential::new(token_type, token, expires_at, role);
        if credential.is_expired() {
            debug!("Stored auth token is expired, clearing session");
            self.clear();
            return None;
        }
        Some(credential)
    }

    /// Persist a credential. An expired credential clears the store instead.
    pub fn save(&self, credential: &Credential) {
        if credential.is_expired() {
            self.clear();
            return;
        }

        let expires_at = credential.expires_at.to_string();
        let entries = [
            (TOKEN_TYPE_KEY, credential.token_type.as_str()),
            (TOKEN_KEY, credential.token.as_str()),
            (TOKEN_EXPIRES_AT_KEY, expires_at.as_str()),
            (TOKEN_ROLE_KEY, credential.role.as_str()),
        ];
        if let Err(e) = self.backend.set_many(&entries) {
            warn!(error = %e, "Failed to persist auth token, clearing partial session");
            self.clear();
        }
    }

    /// Remove every session entry. Safe to call when nothing is stored.
    pub fn clear(&self) {
        debug!("Removing auth token from storage");
        if let Err(e) = self.backend.remove_many(&ALL_KEYS) {
            warn!(error = %e, "Failed to remove auth token from storage");
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session entry");
                None
            }
        }
    }
}

/// Parse a stringified epoch-millisecond timestamp. Fractional values are truncated.
fn parse_expiry(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return Some(ms);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite())
        .map(|ms| ms as i64)
}

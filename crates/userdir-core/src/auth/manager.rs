//! Process-wide holder of the current credential.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::client::{build_http_client, AuthorizedClient, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::api::ApiError;
use crate::utils::join_url;

use super::credential::{now_millis, Credential, Role};
use super::store::SessionStore;

/// Login endpoint relative to the API root
const AUTH_PATH: &str = "auth/";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    access_token: &'a str,
    token_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    token_type: Option<String>,
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    role: Option<Value>,
}

/// Whether a live credential exists, and with which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(Role),
}

struct SessionState {
    credential: Option<Credential>,
    store: SessionStore,
}

impl SessionState {
    /// Assign the current credential, keeping memory and storage in step.
    fn assign(&mut self, credential: Option<Credential>) {
        match credential {
            Some(credential) if credential.is_valid() => {
                self.store.save(&credential);
                self.credential = Some(credential);
            }
            _ => {
                self.store.clear();
                self.credential = None;
            }
        }
    }

    fn current(&mut self) -> Option<Credential> {
        match self.credential {
            Some(ref credential) if credential.is_valid() => Some(credential.clone()),
            Some(_) => {
                debug!("Auth token expired, ending session");
                self.assign(None);
                None
            }
            None => None,
        }
    }
}

/// The configured API root, as given and as parsed for origin matching.
struct ApiRoot {
    raw: String,
    url: Option<Url>,
}

impl ApiRoot {
    fn new(raw: String) -> Self {
        let url = Url::parse(raw.trim()).ok().filter(|u| u.has_host());
        if url.is_none() {
            warn!(
                api_root = %raw,
                "API root is not an absolute URL, requests will not be authorized"
            );
        }
        Self { raw, url }
    }

    /// Same scheme, host and port, and a path at or below the root path.
    fn contains(&self, target: &Url) -> bool {
        let Some(ref root) = self.url else {
            return false;
        };
        if root.origin() != target.origin() {
            return false;
        }
        let root_path = root.path();
        let path = target.path();
        if root_path.ends_with('/') {
            path.starts_with(root_path)
        } else {
            path == root_path
                || path
                    .strip_prefix(root_path)
                    .is_some_and(|rest| rest.starts_with('/'))
        }
    }
}

struct Inner {
    client: Client,
    api_root: RwLock<ApiRoot>,
    state: Mutex<SessionState>,
}

/// Owns the current credential and stamps requests to the API root with it.
///
/// Cloning is cheap and every clone refers to the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// Create a manager with its own HTTP client, restoring any persisted credential.
    pub fn new(api_root: impl Into<String>, store: SessionStore) -> Result<Self, ApiError> {
        let client = build_http_client(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))?;
        Ok(Self::with_client(client, api_root, store))
    }

    /// Create a manager on an existing client, sharing its connection pool.
    pub fn with_client(client: Client, api_root: impl Into<String>, store: SessionStore) -> Self {
        let credential = store.load();
        match credential {
            Some(ref c) => debug!(
                role = %c.role,
                minutes_left = c.minutes_until_expiry(),
                "Restored auth token from storage"
            ),
            None => debug!("No stored auth token"),
        }

        Self {
            inner: Arc::new(Inner {
                client,
                api_root: RwLock::new(ApiRoot::new(api_root.into())),
                state: Mutex::new(SessionState { credential, store }),
            }),
        }
    }

    pub fn api_root(&self) -> String {
        self.inner
            .api_root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .raw
            .clone()
    }

    /// Point future logins and header stamping at a new API root.
    /// The current session is kept.
    pub fn set_api_root(&self, api_root: impl Into<String>) {
        *self
            .inner
            .api_root
            .write()
            .unwrap_or_else(PoisonError::into_inner) = ApiRoot::new(api_root.into());
    }

    pub fn login_url(&self) -> String {
        join_url(&self.api_root(), AUTH_PATH)
    }

    /// The live credential, or `None` if absent or expired.
    pub fn current_credential(&self) -> Option<Credential> {
        self.state().current()
    }

    /// Replace the current credential. `None` or an expired credential ends the session.
    pub fn set_current_credential(&self, credential: Option<Credential>) {
        self.state().assign(credential);
    }

    pub fn auth_state(&self) -> AuthState {
        match self.current_credential() {
            Some(credential) => AuthState::Authenticated(credential.role),
            None => AuthState::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_credential().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.current_credential().map(|c| c.role)
    }

    /// Exchange an identity-provider token for a session credential.
    ///
    /// The callback receives `(true, Some(credential))` for any well-formed
    /// answer, even when the computed expiry is already past; such a
    /// credential is not kept as the current session.
    pub async fn login<F>(&self, exchange_token: &str, exchange_token_type: &str, callback: F)
    where
        F: FnOnce(bool, Option<Credential>),
    {
        match self.exchange(exchange_token, exchange_token_type).await {
            Ok(credential) => {
                self.set_current_credential(Some(credential.clone()));
                info!(
                    role = %credential.role,
                    expires_at = ?credential.expires_at_utc(),
                    "Authentication successful"
                );
                callback(true, Some(credential));
            }
            Err(e) => {
                warn!(
                    url = %self.login_url(),
                    error = %e,
                    validation = e.is_validation(),
                    "Unable to authenticate"
                );
                callback(false, None);
            }
        }
    }

    /// End the session. Never fails and makes no network call.
    pub fn logout<F>(&self, callback: F)
    where
        F: FnOnce(),
    {
        self.set_current_credential(None);
        info!("Logged out");
        callback();
    }

    /// `Authorization` header value for a request to `url`, if it targets the
    /// API root and a live credential exists.
    pub fn authorization_for(&self, url: &str) -> Option<String> {
        self.authorization_for_url(&Url::parse(url).ok()?)
    }

    pub fn authorization_for_url(&self, url: &Url) -> Option<String> {
        let targets_api = self
            .inner
            .api_root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url);
        if !targets_api {
            return None;
        }
        self.current_credential().map(|c| c.authorization_header())
    }

    /// HTTP client that stamps requests to the API root with this session.
    pub fn client(&self) -> AuthorizedClient {
        AuthorizedClient::new(self.inner.client.clone(), self.clone())
    }

    async fn exchange(
        &self,
        exchange_token: &str,
        exchange_token_type: &str,
    ) -> Result<Credential, ApiError> {
        let url = self.login_url();
        let body = LoginRequest {
            access_token: exchange_token,
            token_type: exchange_token_type,
        };

        let response: LoginResponse = self.client().post_json(&url, &body).await?;
        let token = response.token.ok_or(ApiError::MissingField("token"))?;
        let token_type = response
            .token_type
            .ok_or(ApiError::MissingField("token_type"))?;

        let duration_ms = duration_millis(response.duration.as_ref());
        let role = response
            .role
            .as_ref()
            .and_then(Value::as_str)
            .map(Role::parse)
            .unwrap_or_default();

        Ok(Credential::new(
            token_type,
            token,
            now_millis().saturating_add(duration_ms),
            role,
        ))
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Token lifetime in milliseconds from the login `duration` (seconds).
///
/// Numbers and numeric strings are accepted; anything else yields zero,
/// which makes the credential expire immediately.
fn duration_millis(duration: Option<&Value>) -> i64 {
    let seconds = match duration {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    seconds
        .filter(|s| s.is_finite())
        .map(|s| (s * 1000.0) as i64)
        .unwrap_or(0)
}

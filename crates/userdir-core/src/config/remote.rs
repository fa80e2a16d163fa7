//! Remote runtime configuration fetched once before the application starts.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::client::{build_http_client, check_response, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::api::ApiError;
use crate::utils::join_url;

/// Config endpoint relative to the API root
const CONFIG_PATH: &str = "config/";

/// Mandatory key in the config payload
const GOOGLE_CLIENT_ID_KEY: &str = "google_client_id";

#[derive(Debug, Default)]
pub struct ConfigState {
    pub loaded: bool,
    pub error: Option<ApiError>,
}

/// Configuration served by the API. `state.loaded` implies a non-empty
/// `google_client_id`.
#[derive(Debug)]
pub struct Config {
    pub api_root_url: String,
    pub google_client_id: String,
    pub state: ConfigState,
}

impl Config {
    pub fn new(api_root_url: impl Into<String>) -> Self {
        Self {
            api_root_url: api_root_url.into(),
            google_client_id: String::new(),
            state: ConfigState::default(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state.loaded
    }

    pub fn config_url(&self) -> String {
        join_url(&self.api_root_url, CONFIG_PATH)
    }

    fn mark_loaded(&mut self, google_client_id: String) {
        self.google_client_id = google_client_id;
        self.state.loaded = true;
        self.state.error = None;
    }

    fn mark_failed(&mut self, error: ApiError) {
        self.state.loaded = false;
        self.state.error = Some(error);
    }
}

/// One-shot fetch of the remote `Config`. No retries; build a new loader to try again.
pub struct ConfigLoader {
    client: Client,
    config: Config,
}

impl ConfigLoader {
    pub fn new(api_root_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = build_http_client(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))?;
        Ok(Self::with_client(client, api_root_url))
    }

    pub fn with_client(client: Client, api_root_url: impl Into<String>) -> Self {
        Self {
            client,
            config: Config::new(api_root_url),
        }
    }

    pub fn config_url(&self) -> String {
        self.config.config_url()
    }

    /// Fetch the configuration and report the outcome through `loaded`, exactly once.
    pub async fn fetch<F>(mut self, loaded: F) -> Config
    where
        F: FnOnce(bool, &Config),
    {
        let url = self.config_url();
        debug!(url = %url, "Getting client configuration");

        match self.request(&url).await {
            Ok(google_client_id) => {
                self.config.mark_loaded(google_client_id);
                info!(url = %url, "Loaded client configuration");
            }
            Err(e) => {
                warn!(
                    url = %url,
                    error = %e,
                    validation = e.is_validation(),
                    "Client configuration failed to load"
                );
                self.config.mark_failed(e);
            }
        }

        loaded(self.config.state.loaded, &self.config);
        self.config
    }

    async fn request(&self, url: &str) -> Result<String, ApiError> {
        let response = check_response(self.client.get(url).send().await?).await?;

        let payload: Value = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse config from {}: {}", url, e))
        })?;

        payload
            .get(GOOGLE_CLIENT_ID_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(ApiError::MissingField(GOOGLE_CLIENT_ID_KEY))
    }
}

//! Startup gate run before any UI is mounted.

use anyhow::Result;
use tracing::{info, warn};

use crate::api::{build_http_client, DirectoryClient};
use crate::auth::{SessionManager, SessionStore};
use crate::config::{ClientSettings, Config, ConfigLoader};

/// Everything the application needs once startup completes.
pub struct Bootstrap {
    pub config: Config,
    pub session: SessionManager,
}

impl Bootstrap {
    /// Restore the session and fetch the remote config using `settings`.
    ///
    /// A failed config fetch is not an error here: it is reported through
    /// `config.state` and `is_ready()`.
    pub async fn run(settings: &ClientSettings) -> Result<Self> {
        let store = settings.open_store()?;
        Self::run_with_store(settings, store).await
    }

    pub async fn run_with_store(settings: &ClientSettings, store: SessionStore) -> Result<Self> {
        let client = build_http_client(settings.request_timeout())?;
        let session = SessionManager::with_client(client.clone(), &settings.api_root_url, store);

        let config = ConfigLoader::with_client(client, &settings.api_root_url)
            .fetch(|success, config| {
                if success {
                    info!(api_root = %config.api_root_url, "Client configuration ready");
                } else {
                    warn!(api_root = %config.api_root_url, "Client configuration unavailable");
                }
            })
            .await;

        Ok(Self { config, session })
    }

    /// True once the remote configuration loaded and the app may start.
    pub fn is_ready(&self) -> bool {
        self.config.is_loaded()
    }

    pub fn directory(&self) -> DirectoryClient {
        DirectoryClient::new(self.session.clone())
    }
}

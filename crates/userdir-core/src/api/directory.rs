use tracing::warn;

use crate::auth::SessionManager;
use crate::models::{UserRecord, UserResponse};
use crate::utils::join_url;

/// Users endpoint relative to the API root
const USERS_PATH: &str = "users/";

/// Read access to the user directory on behalf of the current session.
#[derive(Clone)]
pub struct DirectoryClient {
    session: SessionManager,
}

impl DirectoryClient {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    pub fn users_url(&self) -> String {
        join_url(&self.session.api_root(), USERS_PATH)
    }

    /// The signed-in user's own record, or `None` on any failure.
    pub async fn me(&self) -> Option<UserRecord> {
        let url = format!("{}me/", self.users_url());
        match self.session.client().get_json::<UserResponse>(&url).await {
            Ok(response) => {
                let user = response.to_user();
                if user.is_none() {
                    warn!(url = %url, "Invalid user response from user API");
                }
                user
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Unable to retrieve user");
                None
            }
        }
    }
}

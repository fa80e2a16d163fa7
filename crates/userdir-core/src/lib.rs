//! Session and bootstrap configuration client for the userdir directory service.
//!
//! The crate fetches and validates the remote runtime configuration before an
//! application starts, and manages the bearer credential used against the API:
//! login exchange, persistence, expiry, role derivation and stamping of
//! outgoing requests.

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiError, AuthorizedClient, DirectoryClient};
pub use auth::{AuthState, Credential, Role, SessionManager, SessionStore};
pub use bootstrap::Bootstrap;
pub use config::{ClientSettings, Config, ConfigLoader};

//! REST API client module for the user-directory service.
//!
//! Requests go through `AuthorizedClient`, which stamps calls to the
//! configured API root with the session's bearer credential.

pub mod client;
pub mod directory;
pub mod error;

pub use client::{
    build_http_client, AuthorizedClient, AuthorizedRequest, DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use directory::DirectoryClient;
pub use error::ApiError;

//! Small helpers shared across modules.

pub mod url;

pub use url::join_url;

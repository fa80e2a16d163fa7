//! Configuration management.
//!
//! - `remote`: the `Config` served by the API and its one-shot `ConfigLoader`
//! - `settings`: local `ClientSettings` read from the user's config directory

pub mod remote;
pub mod settings;

pub use remote::{Config, ConfigLoader, ConfigState};
pub use settings::{ClientSettings, StorageKind};

//! Authentication module for managing the session credential.
//!
//! This module provides:
//! - `Credential` / `Role`: the bearer token, its expiry and the derived role
//! - `SessionStore`: persistence of a credential over a `KeyValueStore`
//! - `SessionManager`: the current session, login/logout and header stamping
//!
//! Backends: `MemoryStore` (in-process), `FileStore` (JSON on disk) and
//! `KeychainStore` (OS keychain via keyring).

pub mod credential;
pub mod keychain;
pub mod manager;
pub mod storage;
pub mod store;

pub use credential::{now_millis, Credential, Role};
pub use keychain::KeychainStore;
pub use manager::{AuthState, SessionManager};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::SessionStore;

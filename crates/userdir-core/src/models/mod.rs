//! Data models for the user directory.
//!
//! - `UserResponse`: raw API payload
//! - `UserRecord`: validated directory user

pub mod user;

pub use user::{UserRecord, UserResponse};

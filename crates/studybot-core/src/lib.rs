//! StudyBot Core - shared foundations for all StudyBot crates.
//!
//! This crate provides functionality used across the dialog engine and the
//! Telegram front-end:
//!
//! - **auth**: Verification client for the external authentication service
//! - **catalog**: Static course catalog (codes, names, descriptions)
//! - **config**: Shared configuration paths, endpoints and tunables
//! - **models**: Persisted user profile and interaction records
//! - **store**: Atomic per-user JSON file persistence

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

// Re-export commonly used items for convenience
pub use auth::{AuthClient, VerifyResponse};
pub use config::{
    auth_service_url, context_expiry, ensure_all_dirs, env_file, knowledge_service_url,
    knowledge_threshold, state_dir, users_dir,
};
pub use error::{CoreError, Result};
pub use models::{Interaction, UserProfile};
pub use store::UserStore;

//! # bridge-platform
//!
//! Client for the external user-management platform (Base44).
//!
//! The only call the bridge makes is a role update:
//!
//! ```text
//! POST {BASE44_API_BASE}/users/{external_user_id}/role
//! Authorization: Bearer {BASE44_API_KEY}
//! Content-Type: application/json
//!
//! {"role":"premium"}
//! ```

pub mod client;
pub mod config;

pub use client::PlatformClient;
pub use config::PlatformConfig;

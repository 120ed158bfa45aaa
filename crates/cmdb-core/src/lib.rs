//! Core library for cmdb, the moderation dashboard of a multiplayer game
//! server's community-management backend.
//!
//! - `api`: the authenticated `ApiClient` and typed endpoint wrappers
//! - `auth`: login/refresh URL building and the `Navigator` host hook
//! - `config`: server origin, API base path and transport settings
//! - `context`: the shared toast/user `AppContext`
//! - `models`: backend payload types

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, RequestOptions};
pub use auth::{FixedNavigator, Location, Navigator};
pub use config::Config;
pub use context::AppContext;

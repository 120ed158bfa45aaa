//! REST API client module for the cmdb backend.
//!
//! This module provides the `ApiClient`, the single entry point the rest of
//! the application uses to talk to the backend, plus typed wrappers for the
//! player, connection, stickyban, ticket, round, whitelist and group
//! management endpoints.
//!
//! Authentication is an HTTP-only session cookie issued by the identity
//! provider; the client only reacts to 401/403 responses.

pub mod client;
pub mod error;
pub mod request;
pub mod resources;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::RequestOptions;
pub use resources::{ConnectionLookup, StickybanLookup, StickybanMatches, TicketRange, UserQuery};

//! Session handling that lives on the client side.
//!
//! The session itself is a server-managed cookie the client never inspects.
//! This module provides:
//! - `Location`: the in-app location a login should return the user to
//! - `login_url` / `refresh_url`: the `/auth/*` endpoint builders
//! - `Navigator`: the host that owns the current location and performs the
//!   login redirect

pub mod navigator;
pub mod redirect;

pub use navigator::{FixedNavigator, Navigator};
pub use redirect::{login_url, refresh_url, Location, SESSION_RELOADED_MARKER};

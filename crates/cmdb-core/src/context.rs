//! Application-wide state shared by every view: the toast message line and
//! the signed-in user.
//!
//! One `AppContext` is created at start-up and handed out as
//! `Arc<AppContext>`; it lives for the rest of the process and is only
//! changed through the methods below.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::auth::{Location, SESSION_RELOADED_MARKER};
use crate::models::User;

/// How long a toast stays visible.
const TOAST_VISIBLE_SECS: i64 = 3;

/// Shown once after the login flow restored an expired session.
pub const SESSION_RELOADED_MESSAGE: &str = "Session reloaded as you were timed out.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            shown_at: Utc::now(),
        }
    }

    pub fn is_visible(&self) -> bool {
        Utc::now() - self.shown_at < Duration::seconds(TOAST_VISIBLE_SECS)
    }
}

#[derive(Debug, Default)]
pub struct AppContext {
    toast: RwLock<Option<Toast>>,
    user: RwLock<Option<User>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current toast.
    pub fn show_toast(&self, message: impl Into<String>) {
        let toast = Toast::new(message);
        debug!(message = %toast.message, "Toast");
        *self.toast.write().unwrap_or_else(PoisonError::into_inner) = Some(toast);
    }

    /// The toast message, while it is still visible.
    pub fn current_toast(&self) -> Option<String> {
        self.toast
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|t| t.is_visible())
            .map(|t| t.message.clone())
    }

    pub fn set_user(&self, user: User) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn user(&self) -> Option<User> {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Show the session-restored notice if the login flow marked `location`.
    /// Returns whether the notice was shown.
    pub fn notice_for(&self, location: &Location) -> bool {
        let (key, value) = SESSION_RELOADED_MARKER;
        if location.has_query_pair(key, value) {
            self.show_toast(SESSION_RELOADED_MESSAGE);
            true
        } else {
            false
        }
    }
}

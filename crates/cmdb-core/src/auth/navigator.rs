use std::sync::{Mutex, PoisonError};

use url::Url;

use super::Location;

/// The host the client runs in: it knows where the user currently is and
/// can send them somewhere else.
///
/// `ApiClient` uses this only for the login redirect. Implementations must be
/// cheap to call and must not block.
pub trait Navigator: Send + Sync {
    /// The location to return to after logging in.
    fn current_location(&self) -> Location;

    /// Leave the application for `url`.
    fn navigate(&self, url: &Url);
}

/// A navigator with a settable location that records where it was sent.
#[derive(Debug, Default)]
pub struct FixedNavigator {
    location: Mutex<Location>,
    navigated_to: Mutex<Option<Url>>,
}

impl FixedNavigator {
    pub fn new(location: Location) -> Self {
        Self {
            location: Mutex::new(location),
            navigated_to: Mutex::new(None),
        }
    }

    pub fn set_location(&self, location: Location) {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = location;
    }

    /// The last navigation target, if any.
    pub fn navigated_to(&self) -> Option<Url> {
        self.navigated_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for FixedNavigator {
    fn current_location(&self) -> Location {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, url: &Url) {
        *self.navigated_to.lock().unwrap_or_else(PoisonError::into_inner) = Some(url.clone());
    }
}

use cmdb_core::{Location, Navigator};
use tracing::info;
use url::Url;

/// Navigator for a terminal session: the current location is the dashboard
/// page matching the command being run, and navigating prints the URL for
/// the operator to open.
pub struct TerminalNavigator {
    location: Location,
}

impl TerminalNavigator {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

impl Navigator for TerminalNavigator {
    fn current_location(&self) -> Location {
        self.location.clone()
    }

    fn navigate(&self, url: &Url) {
        info!(%url, "Login required");
        eprintln!("Your session has expired. Log in again at:\n  {}", url);
    }
}

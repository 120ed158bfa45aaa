//! Builders for the `/auth/*` endpoints and the in-app location they
//! redirect back to.

use std::fmt;

use url::Url;

/// Path of the silent session refresh endpoint, relative to the API base.
const REFRESH_PATH: &str = "/auth/refresh";

/// Path of the interactive login endpoint, relative to the API base.
const LOGIN_PATH: &str = "/auth/login";

/// Query parameter carrying the location to return to after login.
const REDIRECT_PARAM: &str = "redirect";

/// Query marker the login flow appends when it restores an expired session.
pub const SESSION_RELOADED_MARKER: (&str, &str) = ("forceRefresh", "true");

/// A location inside the dashboard: path, query and fragment.
///
/// `query` and `fragment` are stored without their leading `?` / `#`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = fragment.into();
        self
    }

    /// Parse a relative location such as `/user/foo?tab=notes#top`.
    pub fn parse(raw: &str) -> Self {
        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, fragment),
            None => (raw, ""),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };
        Self {
            path: path.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// Path + query + fragment, the form handed to the login endpoint.
    pub fn as_relative(&self) -> String {
        let mut out = if self.path.is_empty() {
            "/".to_string()
        } else {
            self.path.clone()
        };
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query);
        }
        if !self.fragment.is_empty() {
            out.push('#');
            out.push_str(&self.fragment);
        }
        out
    }

    /// Whether the query contains `key=value`.
    pub fn has_query_pair(&self, key: &str, value: &str) -> bool {
        url::form_urlencoded::parse(self.query.as_bytes()).any(|(k, v)| k == key && v == value)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_relative())
    }
}

/// `{base}/auth/refresh`
pub fn refresh_url(base: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}{}", base, REFRESH_PATH))
}

/// `{base}/auth/login?redirect=<percent-encoded location>`
pub fn login_url(base: &str, location: &Location) -> Result<Url, url::ParseError> {
    let target = location.as_relative();
    Url::parse(&format!(
        "{}{}?{}={}",
        base,
        LOGIN_PATH,
        REDIRECT_PARAM,
        urlencoding::encode(&target)
    ))
}

//! API client for the cmdb backend.
//!
//! Every call the application makes goes through `ApiClient::call_api`, which
//! attaches the session cookie, renews an expired session once and replays
//! the request, or sends the user to log in when renewal fails.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{login_url, refresh_url, Navigator};
use crate::config::Config;

use super::{ApiError, RequestOptions};

/// Path of the OIDC userinfo endpoint, always at the root of the host.
const USERINFO_PATH: &str = "/oauth2/userinfo";

/// API client for the cmdb backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    origin: Url,
    base: String,
    api_path: String,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client for the configured server.
    ///
    /// A configured session cookie is seeded into the client's cookie jar;
    /// cookies the backend sets later (e.g. on refresh) are kept there too.
    pub fn new(config: &Config, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let origin = config
            .origin()
            .map_err(|e| ApiError::InvalidRequest(format!("{:#}", e)))?;
        let base = config
            .api_base()
            .map_err(|e| ApiError::InvalidRequest(format!("{:#}", e)))?;

        let jar = Arc::new(Jar::default());
        if let Some(ref cookie) = config.session_cookie {
            jar.add_cookie_str(cookie, &origin);
        }

        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            origin,
            base,
            api_path: config.api_path(),
            navigator,
        })
    }

    /// Absolute API base, e.g. `https://cmdb.example.org/api`.
    pub fn api_base(&self) -> &str {
        &self.base
    }

    /// Make an authenticated call to `path` under the API base.
    ///
    /// The response is returned untouched for any status except:
    /// - 401: the session is refreshed once and the request replayed once;
    ///   the replay's response is returned whatever its status. If the
    ///   refresh fails the navigator is sent to the login page and
    ///   `ApiError::SessionExpired` is returned.
    /// - 403: `ApiError::Forbidden`, without a refresh attempt.
    ///
    /// Transport failures of the request itself are returned as
    /// `ApiError::Network`.
    pub async fn call_api(&self, path: &str, options: &RequestOptions) -> Result<Response, ApiError> {
        let url = self.endpoint(path)?;

        debug!(method = %options.method, path, "Calling API");
        let response = self.send(&url, options).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                info!(path, "Session rejected, attempting refresh");
                if self.refresh_session().await {
                    debug!(path, "Session refreshed, retrying request");
                    let retried = self.send(&url, options).await?;
                    debug!(path, status = %retried.status(), "Retry completed");
                    return Ok(retried);
                }
                Err(self.redirect_to_login())
            }
            StatusCode::FORBIDDEN => {
                warn!(method = %options.method, path, "Access denied");
                Err(ApiError::Forbidden)
            }
            status => {
                debug!(path, status = %status, "API response received");
                Ok(response)
            }
        }
    }

    /// Ask the backend to renew the session.
    ///
    /// Returns `true` on a 2xx response. Transport errors count as a failed
    /// refresh and are not propagated.
    pub async fn refresh_session(&self) -> bool {
        let url = match refresh_url(&self.base) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Invalid refresh URL");
                return false;
            }
        };

        match self.client.post(url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Session refreshed");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "Session refresh rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "Session refresh request failed");
                false
            }
        }
    }

    /// Fetch the signed-in user from the identity proxy.
    ///
    /// This endpoint lives at the origin, outside the API base, and is not
    /// subject to refresh handling.
    pub async fn fetch_user_info(&self) -> Result<crate::models::User, ApiError> {
        let url = self
            .origin
            .join(USERINFO_PATH)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse user info: {}", e)))
    }

    /// Send the user to the login page and build the error that ends the call.
    fn redirect_to_login(&self) -> ApiError {
        let location = self.navigator.current_location();
        match login_url(&self.base, &location) {
            Ok(url) => {
                info!(%location, "Session refresh failed, redirecting to login");
                self.navigator.navigate(&url);
                ApiError::SessionExpired {
                    login_url: url.to_string(),
                }
            }
            Err(e) => ApiError::InvalidRequest(format!("Failed to build login URL: {}", e)),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.check_path(path)?;
        Url::parse(&format!("{}{}", self.base, path))
            .map_err(|e| ApiError::InvalidPath(format!("{}: {}", path, e)))
    }

    /// Paths are relative to the API base and must not repeat it.
    fn check_path(&self, path: &str) -> Result<(), ApiError> {
        if !path.starts_with('/') {
            return Err(ApiError::InvalidPath(format!("{} must start with '/'", path)));
        }
        let prefix = self.api_path.as_str();
        if !prefix.is_empty() {
            let rest = path.strip_prefix(prefix);
            if matches!(rest, Some(r) if r.is_empty() || r.starts_with(['/', '?', '#'])) {
                return Err(ApiError::InvalidPath(format!(
                    "{} already includes the API base {}",
                    path, prefix
                )));
            }
        }
        Ok(())
    }

    async fn send(&self, url: &Url, options: &RequestOptions) -> Result<Response, reqwest::Error> {
        let mut request = self
            .client
            .request(options.method.clone(), url.clone())
            .headers(options.headers.clone());
        if let Some(ref body) = options.body {
            request = request.body(body.clone());
        }
        request.send().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::FixedNavigator;

    fn client(api_path: &str) -> ApiClient {
        let config = Config {
            server_url: "https://cmdb.example.org".to_string(),
            api_path: api_path.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config, Arc::new(FixedNavigator::default())).unwrap()
    }

    #[test]
    fn test_endpoint_prepends_base() {
        let client = client("/api");
        assert_eq!(client.api_base(), "https://cmdb.example.org/api");
        assert_eq!(
            client.endpoint("/User?ckey=foo").unwrap().as_str(),
            "https://cmdb.example.org/api/User?ckey=foo"
        );
    }

    #[test]
    fn test_path_must_be_relative_to_base() {
        let client = client("/api");
        assert!(matches!(client.check_path("User"), Err(ApiError::InvalidPath(_))));
        assert!(matches!(client.check_path("/api/User"), Err(ApiError::InvalidPath(_))));
        assert!(matches!(client.check_path("/api"), Err(ApiError::InvalidPath(_))));
        // Only a whole segment counts as the prefix
        assert!(client.check_path("/apiary").is_ok());
        assert!(client.check_path("/Round/Recent").is_ok());
    }

    #[test]
    fn test_root_api_path_accepts_any_absolute_path() {
        let client = client("/");
        assert_eq!(client.api_base(), "https://cmdb.example.org");
        assert!(client.check_path("/api/User").is_ok());
    }

    #[test]
    fn test_invalid_server_url_is_rejected() {
        let config = Config {
            server_url: "::".to_string(),
            ..Config::default()
        };
        let result = ApiClient::new(&config, Arc::new(FixedNavigator::default()));
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }
}

//! Shared setup for integration tests: a mock backend and a client
//! pointed at it.

#![allow(dead_code)]

use std::sync::Arc;

use cmdb_core::{ApiClient, Config, FixedNavigator, Location};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestBackend {
    pub server: MockServer,
    pub client: ApiClient,
    pub navigator: Arc<FixedNavigator>,
}

impl TestBackend {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with<F: FnOnce(&mut Config)>(configure: F) -> Self {
        let server = MockServer::start().await;
        let mut config = Config {
            server_url: server.uri(),
            ..Config::default()
        };
        configure(&mut config);

        let navigator = Arc::new(FixedNavigator::new(Location::new("/user/foo")));
        let client = ApiClient::new(&config, navigator.clone()).expect("client should build");

        Self {
            server,
            client,
            navigator,
        }
    }

    /// Requests the mock server has seen, in order.
    pub async fn requests(&self) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
    }

    /// Mount the refresh endpoint answering with `status`.
    pub async fn mount_refresh(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mount a refresh endpoint that must never be called.
    pub async fn forbid_refresh(&self) {
        Mock::given(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .named("refresh endpoint")
            .mount(&self.server)
            .await;
    }
}

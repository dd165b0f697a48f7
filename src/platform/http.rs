// LogPanel - platform/http.rs
//
// `Transport` over the host's REST API using reqwest.
// The token is passed through as a bearer header; obtaining it is the
// caller's business.

use crate::app::transport::Transport;
use crate::util::constants;
use crate::util::error::{self, ConfigError, FetchError};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::time::Duration;

/// HTTP transport rooted at `<host>/api/`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_root: Url,
    token: Option<String>,
}

impl HttpTransport {
    /// Build a transport for `host_url` (e.g. `http://homeassistant.local:8123`).
    pub fn new(
        host_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> error::Result<Self> {
        let api_root = api_root(host_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!(
                "{}/{}",
                constants::APP_NAME,
                constants::APP_VERSION
            ))
            .build()
            .map_err(|source| FetchError::Network {
                path: api_root.to_string(),
                source,
            })?;

        tracing::debug!(
            api_root = %api_root,
            authenticated = token.is_some(),
            timeout_secs = timeout.as_secs(),
            "HTTP transport ready"
        );

        Ok(Self {
            client,
            api_root,
            token,
        })
    }

    /// Root URL every endpoint path is resolved against.
    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    async fn get(&self, path: &str) -> Result<Response, FetchError> {
        let url = self
            .api_root
            .join(path)
            .map_err(|e| FetchError::Unavailable {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| FetchError::Network {
            path: path.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, path: &str) -> Result<String, FetchError> {
        self.get(path)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Network {
                path: path.to_string(),
                source,
            })
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        self.get(path)
            .await?
            .json::<serde_json::Value>()
            .await
            .map_err(|source| {
                if source.is_decode() {
                    FetchError::Decode {
                        path: path.to_string(),
                        reason: source.to_string(),
                    }
                } else {
                    FetchError::Network {
                        path: path.to_string(),
                        source,
                    }
                }
            })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token.
        f.debug_struct("HttpTransport")
            .field("api_root", &self.api_root.as_str())
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

/// Resolve `<host_url>/api/`, tolerating a missing trailing slash.
fn api_root(host_url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: host_url.to_string(),
        reason,
    };

    let mut base = Url::parse(host_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "scheme '{}' is not http or https",
            base.scheme()
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(constants::API_ROOT_SEGMENT)
        .map_err(|e| invalid(e.to_string()))
}

//! HTTP client for the daemon control API
//!
//! Every request carries the configured bearer credential. Non-2xx answers
//! become `AppError::DaemonStatus` with the raw upstream body so reports can
//! show the daemon's own message.

use crate::config::DaemonConfig;
use crate::daemon::types::{DaemonConfigs, DaemonVersion, ProxyEntry, ProxyTable};
use crate::error::{AppError, AppResult};
use reqwest::{Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Extra time granted to a delay request beyond the daemon-side probe timeout
const DELAY_REQUEST_SLACK: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct DelayResponse {
    delay: u32,
}

/// Client for one daemon instance
#[derive(Debug, Clone)]
pub struct DaemonClient {
    http: reqwest::Client,
    base: Url,
    secret: String,
}

impl DaemonClient {
    /// Build a client from the `[daemon]` configuration section
    ///
    /// # Errors
    /// Returns `AppError::Config` if `api_url` is not a usable base URL, or
    /// `AppError::Internal` if the HTTP client cannot be constructed.
    pub fn new(config: &DaemonConfig) -> AppResult<Self> {
        let base = Url::parse(&config.api_url).map_err(|e| {
            AppError::Config(format!(
                "daemon.api_url '{}' is not a valid URL: {}",
                config.api_url, e
            ))
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "daemon.api_url '{}' cannot be used as a base URL",
                config.api_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(api_url = %base, "Daemon client created");

        Ok(Self {
            http,
            base,
            secret: config.secret.clone(),
        })
    }

    /// Base URL of the control API
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /version`
    pub async fn version(&self) -> AppResult<DaemonVersion> {
        self.get_json(&["version"]).await
    }

    /// `GET /configs`
    pub async fn configs(&self) -> AppResult<DaemonConfigs> {
        self.get_json(&["configs"]).await
    }

    /// `GET /proxies`: the full node/group table
    pub async fn proxies(&self) -> AppResult<ProxyTable> {
        self.get_json(&["proxies"]).await
    }

    /// `GET /proxies/{name}`: a single node or group
    pub async fn proxy(&self, name: &str) -> AppResult<ProxyEntry> {
        self.get_json(&["proxies", name]).await
    }

    /// `GET /proxies/{name}/delay?timeout=..&url=..`
    ///
    /// Asks the daemon to measure latency through `name`. Errors are returned
    /// as-is; the prober decides what a failure means.
    pub async fn delay(&self, name: &str, timeout_ms: u64, target_url: &str) -> AppResult<u32> {
        let mut url = self.endpoint(&["proxies", name, "delay"])?;
        url.query_pairs_mut()
            .append_pair("timeout", &timeout_ms.to_string())
            .append_pair("url", target_url);

        let path = display_path(&["proxies", name, "delay"]);
        let request = self
            .request(Method::GET, url)
            .timeout(Duration::from_millis(timeout_ms) + DELAY_REQUEST_SLACK);
        let body: DelayResponse = self.send_json(&path, request).await?;
        Ok(body.delay)
    }

    /// `PUT /proxies/{group}` with `{"name": node}`
    ///
    /// Changes the group's active selection. The daemon enforces membership;
    /// nothing is validated locally.
    pub async fn select(&self, group: &str, node: &str) -> AppResult<()> {
        let url = self.endpoint(&["proxies", group])?;
        let path = display_path(&["proxies", group]);
        let request = self
            .request(Method::PUT, url)
            .json(&serde_json::json!({ "name": node }));

        self.send(&path, request).await?;
        tracing::info!(group = %group, node = %node, "Group selection switched");
        Ok(())
    }

    /// `PUT /configs?force=true` with `{"path": path}`
    ///
    /// Makes the daemon replace its running configuration with the file at
    /// `path`, which must be readable by the daemon process.
    pub async fn reload_config(&self, path: &str) -> AppResult<()> {
        let mut url = self.endpoint(&["configs"])?;
        url.query_pairs_mut().append_pair("force", "true");
        let request = self
            .request(Method::PUT, url)
            .json(&serde_json::json!({ "path": path }));

        self.send("/configs", request).await?;
        tracing::info!(path = %path, "Daemon configuration reloaded");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> AppResult<T> {
        let url = self.endpoint(segments)?;
        let path = display_path(segments);
        self.send_json(&path, self.request(Method::GET, url)).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> AppResult<T> {
        let response = self.send(path, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| AppError::DaemonUnreachable {
                path: path.to_string(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|e| AppError::DaemonResponse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> AppResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|source| AppError::DaemonUnreachable {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            path = %path,
            status = status.as_u16(),
            body = %body,
            "Daemon rejected request"
        );
        Err(AppError::DaemonStatus {
            path: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.secret)
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::Config(format!(
                    "daemon.api_url '{}' cannot be used as a base URL",
                    self.base
                ))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

fn display_path(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(api_url: &str) -> DaemonClient {
        let config = DaemonConfig {
            api_url: api_url.to_string(),
            secret: "token".to_string(),
            request_timeout_seconds: 5,
        };
        DaemonClient::new(&config).expect("should build client")
    }

    #[test]
    fn test_endpoint_percent_encodes_node_names() {
        let client = client_for("http://127.0.0.1:9097");
        let url = client.endpoint(&["proxies", "🇭🇰 HK/01", "delay"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9097/proxies/%F0%9F%87%AD%F0%9F%87%B0%20HK%2F01/delay"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = client_for("http://127.0.0.1:9097/api/");
        let url = client.endpoint(&["proxies"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9097/api/proxies");
    }

    #[test]
    fn test_invalid_api_url_is_config_error() {
        let config = DaemonConfig {
            api_url: "not a url".to_string(),
            secret: String::new(),
            request_timeout_seconds: 5,
        };
        let err = DaemonClient::new(&config).expect_err("should reject bad url");
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_display_path_is_unencoded() {
        assert_eq!(display_path(&["proxies", "HK 01"]), "/proxies/HK 01");
    }
}

// RESTCONF HTTP client
//
// Wraps `reqwest::Client` with device URL construction, basic auth, and
// status-to-error mapping. Create is a PATCH (merge) so that writing a
// list entry does not disturb sibling config; update is a PUT, the full
// replace the reconciler's semantics require.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use xeconf_core::{RemoteObject, RemoteStore, StoreError};

use crate::error::Error;
use crate::transport::TransportConfig;

/// Connection parameters for one device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device root, e.g. `https://10.0.0.1`.
    pub base_url: Url,
    pub username: String,
    pub password: String,
    pub transport: TransportConfig,
}

/// HTTP `RemoteStore` over a device's RESTCONF interface.
pub struct RestconfClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
}

impl RestconfClient {
    pub fn new(config: &DeviceConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, config: &DeviceConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Full URL for a RESTCONF data path: `{base}/restconf/{path}`.
    fn restconf_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/restconf/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Send, then map non-success statuses before the caller touches the
    /// body.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let resp = request.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::from_status(status, body))
    }

    async fn get_object(&self, path: &str) -> Result<RemoteObject, Error> {
        let url = self.restconf_url(path)?;
        debug!("GET {url}");
        let resp = self.send(self.request(reqwest::Method::GET, url)).await?;
        let body: serde_json::Value = resp.json().await.map_err(|e| Error::MalformedBody {
            message: e.to_string(),
        })?;
        Ok(RemoteObject::from_json(body))
    }

    async fn write_object(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &RemoteObject,
    ) -> Result<(), Error> {
        let url = self.restconf_url(path)?;
        debug!("{method} {url}");
        let request = self.request(method, url).json(&body.to_json());
        self.send(request).await?;
        Ok(())
    }

    async fn delete_object(&self, path: &str) -> Result<(), Error> {
        let url = self.restconf_url(path)?;
        debug!("DELETE {url}");
        self.send(self.request(reqwest::Method::DELETE, url)).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for RestconfClient {
    async fn create(&self, path: &str, body: &RemoteObject) -> Result<(), StoreError> {
        self.write_object(reqwest::Method::PATCH, path, body)
            .await
            .map_err(StoreError::from)
    }

    async fn read(&self, path: &str) -> Result<RemoteObject, StoreError> {
        self.get_object(path).await.map_err(StoreError::from)
    }

    async fn update(&self, path: &str, body: &RemoteObject) -> Result<(), StoreError> {
        self.write_object(reqwest::Method::PUT, path, body)
            .await
            .map_err(StoreError::from)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.delete_object(path).await.map_err(StoreError::from)
    }
}

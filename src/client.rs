use crate::error::{Error, Result};
use crate::help::{AppInfo, ConsoleHelp, FullHelp, HelpFormat};
use log::debug;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Basic-auth user name the local service expects
pub const AUTH_USER: &str = "riot";

const HELP_ENDPOINT: &str = "/help";
const APP_INFO_ENDPOINT: &str = "/riotclient/v1/app-info";

/// Authenticated client for the service's introspection endpoints.
///
/// The service listens on loopback with a self-signed certificate, so
/// certificate validation is turned off.
#[derive(Clone)]
pub struct HelpClient {
    client: reqwest::Client,
    base_url: Url,
    secret: String,
}

impl HelpClient {
    /// Client for `https://127.0.0.1:{port}`
    pub fn new(port: u16, secret: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&format!("https://127.0.0.1:{}", port))
            .map_err(|e| Error::Config(format!("invalid port {}: {}", port, e)))?;
        Self::with_base_url(base_url, secret, timeout)
    }

    /// Client for an explicit base URL. A path prefix such as `https://host/prefix`
    /// is kept in front of every endpoint.
    pub fn with_base_url(mut base_url: Url, secret: impl Into<String>, timeout: Duration) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::Config("the service secret is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            secret,
        })
    }

    /// Base URL without a trailing slash, as advertised in `servers`
    pub fn base_url(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }

    /// `GET /help?format=<format>` as raw JSON
    pub async fn fetch_help(&self, format: HelpFormat) -> Result<serde_json::Value> {
        self.get_json(HELP_ENDPOINT, &[("format", format.as_str())]).await
    }

    pub async fn fetch_console_help(&self) -> Result<ConsoleHelp> {
        self.get_json(HELP_ENDPOINT, &[("format", HelpFormat::Console.as_str())])
            .await
    }

    pub async fn fetch_full_help(&self) -> Result<FullHelp> {
        self.get_json(HELP_ENDPOINT, &[("format", HelpFormat::Full.as_str())])
            .await
    }

    pub async fn fetch_app_info(&self) -> Result<AppInfo> {
        self.get_json(APP_INFO_ENDPOINT, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .basic_auth(AUTH_USER, Some(&self.secret))
            .send()
            .await
            .map_err(|e| Error::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| Error::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        debug!("{} returned {} bytes", endpoint, body.len());

        serde_json::from_slice(&body).map_err(|e| Error::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

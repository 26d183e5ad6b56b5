use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use super::http::{send_with_retry, RetryPolicy};
use crate::credentials::Token;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com/";

/// Override for GitHub Enterprise installations
pub const API_URL_ENV: &str = "PRBOT_API_URL";

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
pub(super) const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const API_VERSION: &str = "2022-11-28";

/// Default CLI version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string
fn build_user_agent() -> String {
    std::env::var("PRBOT_USER_AGENT").unwrap_or_else(|_| format!("prbot/{}", DEFAULT_VERSION))
}

/// Resolve the API base URL, ensuring a trailing slash so `join` appends.
pub fn resolve_api_url(raw: Option<String>) -> Result<Url> {
    let raw = raw.unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let with_slash = if raw.ends_with('/') {
        raw
    } else {
        format!("{}/", raw)
    };
    Url::parse(&with_slash).with_context(|| format!("Invalid API URL: {}", with_slash))
}

/// HTTP client for the GitHub REST API
pub struct ApiClient {
    client: Client,
    base_url: Url,
    user_agent: String,
    token: Token,
}

impl ApiClient {
    /// Create a client for `base_url` authenticating with `token`.
    pub fn new(base_url: Url, token: Token) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            user_agent: build_user_agent(),
            token,
        })
    }

    /// Create a client from the environment (`PRBOT_API_URL`).
    pub fn from_env(token: Token) -> Result<Self> {
        let base_url = resolve_api_url(std::env::var(API_URL_ENV).ok())?;
        Self::new(base_url, token)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build URL for endpoint: {}", path))
    }

    fn request(&self, method: Method, url: &Url, accept: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url.clone())
            .header("Accept", accept)
            .header("User-Agent", &self.user_agent)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("Authorization", format!("Bearer {}", self.token.secret()))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        accept: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);

        let response = send_with_retry(RetryPolicy::for_method(&method), || {
            let request = self.request(method.clone(), &url, accept);
            match body {
                Some(body) => request.json(body),
                None => request,
            }
        })
        .await
        .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        debug!("Status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("{} {} failed with status {}: {}", method, url, status, error_text);
            anyhow::bail!("{} {} failed with status {}: {}", method, url, status, error_text);
        }

        Ok(response)
    }

    /// GET a JSON document
    pub(super) async fn get_json<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(Method::GET, path, JSON_MEDIA_TYPE, None).await?;
        let text = response
            .text()
            .await
            .context("Failed to read response body")?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse response of {}", path))
    }

    /// GET raw bytes with a custom media type
    pub(super) async fn get_bytes(&self, path: &str, accept: &str) -> Result<Vec<u8>> {
        let response = self.send(Method::GET, path, accept, None).await?;
        let bytes = response
            .bytes()
            .await
            .context("Failed to read response body")?;
        Ok(bytes.to_vec())
    }

    /// POST a JSON body and decode the JSON response
    pub(super) async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body).context("Failed to encode request body")?;
        let response = self
            .send(Method::POST, path, JSON_MEDIA_TYPE, Some(&body))
            .await?;
        let text = response
            .text()
            .await
            .context("Failed to read response body")?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse response of {}", path))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("token", &self.token)
            .finish()
    }
}

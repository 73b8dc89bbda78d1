//! Thin HTTP client over the Shopwise API.

use std::sync::Arc;

use reqwest::{Method, StatusCode, header};
use serde::de::DeserializeOwned;
use thiserror::Error;

use shopwise_catalog::Product;
use shopwise_core::ProductId;

use crate::{ClientConfig, SessionStore};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("invalid request path '{0}'")]
    InvalidPath(String),
}

/// Per-request options for [`ApiClient::fetch_with_auth`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Send the request anonymously even if a session exists.
    pub skip_auth: bool,
    /// JSON body, if any.
    pub json: Option<serde_json::Value>,
}

impl FetchOptions {
    pub fn anonymous() -> Self {
        Self {
            skip_auth: true,
            ..Self::default()
        }
    }

    pub fn with_json(json: serde_json::Value) -> Self {
        Self {
            json: Some(json),
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    sessions: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, sessions: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http, config, sessions })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> Result<String, ClientError> {
        if !path.starts_with('/') || path.starts_with("//") {
            return Err(ClientError::InvalidPath(path.to_string()));
        }
        Ok(format!("{}{}", self.config.api_url, path))
    }

    /// Build (but do not send) a request.
    ///
    /// `Authorization: Bearer <token>` is attached when a session exists and
    /// `skip_auth` is false; otherwise the header is omitted.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        options: &FetchOptions,
    ) -> Result<reqwest::Request, ClientError> {
        let mut builder = self
            .http
            .request(method, self.url(path)?)
            .header(header::ACCEPT, "application/json");

        if !options.skip_auth {
            if let Some(session) = self.sessions.current() {
                builder = builder.bearer_auth(&session.access_token);
            }
        }
        if let Some(json) = &options.json {
            builder = builder.json(json);
        }

        Ok(builder.build()?)
    }

    /// Send a request to `path` on the API, authenticated from the session
    /// store unless `options.skip_auth` is set.
    ///
    /// Non-2xx responses are returned as-is; callers decide what they mean.
    pub async fn fetch_with_auth(
        &self,
        method: Method,
        path: &str,
        options: FetchOptions,
    ) -> Result<reqwest::Response, ClientError> {
        let request = self.build_request(method, path, &options)?;
        tracing::debug!(method = %request.method(), url = %request.url(), "api request");
        Ok(self.http.execute(request).await?)
    }

    /// GET `path` and decode JSON, treating non-2xx as an error.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, options: FetchOptions) -> Result<T, ClientError> {
        let res = self.fetch_with_auth(Method::GET, path, options).await?;
        if !res.status().is_success() {
            return Err(ClientError::Status(res.status()));
        }
        Ok(res.json().await?)
    }

    /// `GET /api/products/public/:id`.
    pub async fn public_product(&self, id: ProductId) -> Result<Product, ClientError> {
        self.get_json(&format!("/api/products/public/{id}"), FetchOptions::anonymous())
            .await
    }
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

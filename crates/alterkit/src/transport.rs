//! HTTP channel to the backend edit API.

use crate::TransportError;
use alterkit_config::ApiConfig;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;

/// A request/response channel that can POST a JSON body to an API path.
///
/// Implementations return the raw response body on a 2xx status and a
/// [`TransportError`] otherwise.
pub trait EditTransport: Send + Sync {
    fn post(
        &self,
        path: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

impl<T: EditTransport> EditTransport for &T {
    fn post(
        &self,
        path: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).post(path, body)
    }
}

/// [`EditTransport`] over a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport with a default client.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a transport around an existing client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, TransportError> {
        // Paths are joined relative to the base, which only keeps the last
        // segment of the base path if it ends with a slash.
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }

        let base_url = Url::parse(&normalized).map_err(|e| TransportError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Build a transport from the `api` section of the config file.
    pub fn from_config(config: &ApiConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        Self::with_client(builder.build()?, &config.base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path such as `/api/database/1/edit` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl {
                url: path.to_string(),
                message: e.to_string(),
            })
    }
}

impl EditTransport for HttpTransport {
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }
}

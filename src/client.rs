//! HTTP transport for the Zoho endpoints.
//!
//! Thin wrapper over `reqwest`: URL-encoded GET for the read path,
//! form-encoded POST for the write path. Application-level errors are the
//! normalizer's business; this layer only fails on transport problems and
//! non-success HTTP statuses.

use tracing::debug;

use crate::config::ZohoConfig;
use crate::error::{Error, ErrorKind, Result};

/// HTTP client for the Zoho API.
#[derive(Debug, Clone)]
pub struct ZohoHttpClient {
    inner: reqwest::Client,
}

impl ZohoHttpClient {
    /// Create a new HTTP client from the configuration's timeouts.
    pub fn new(config: &ZohoConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(crate::USER_AGENT)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner })
    }

    /// Issue a GET request with URL-encoded parameters, returning the body.
    pub async fn get(&self, url: &str, params: &[(String, String)]) -> Result<String> {
        debug!(url, "GET");
        let response = self.inner.get(url).query(params).send().await?;
        Self::body(response).await
    }

    /// Issue a POST request with a form-encoded body, returning the body.
    pub async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String> {
        debug!(url, "POST");
        let response = self.inner.post(url).form(form).send().await?;
        Self::body(response).await
    }

    async fn body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::new(ErrorKind::Http {
                status: status.as_u16(),
                message,
            }));
        }
        response.text().await.map_err(Into::into)
    }
}

//! Generative language API client implementation.

use std::time::Duration;

use littlestar_core::{Error, HttpError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::config::ClientConfig;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the generative language API.
///
/// Cheap to clone; the underlying HTTP client is shared. Requests are not
/// retried and responses are not cached; a failed call is reported to the
/// caller exactly once.
#[derive(Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    pub(crate) config: ClientConfig,
}

impl GenAiClient {
    /// Create a new client from a configuration.
    #[allow(clippy::unwrap_used)] // Header values are ASCII-safe
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(config.api_key())
                .map_err(|_| Error::InvalidArgument("API key is not a valid header".into()))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Call `generateContent` on a model.
    pub(crate) async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{model}:generateContent", self.config.base_url());
        debug!("POST {url} ({} content turns)", request.contents.len());

        let response = self.http.post(&url).json(request).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Http(HttpError::Timeout)
            } else if e.is_connect() {
                Error::Http(HttpError::ConnectionFailed(e.to_string()))
            } else {
                Error::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Http(HttpError::StatusError {
                status: status.as_u16(),
                message,
            }));
        }

        response
            .json()
            .await
            .map_err(|e| Error::ParseError(format!("failed to parse response: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GenAiClient::new(ClientConfig::new("test-key")).unwrap();
        assert_eq!(client.config.api_key(), "test-key");
    }

    #[test]
    fn test_non_ascii_key_rejected() {
        let result = GenAiClient::new(ClientConfig::new("clé\n"));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}

//! HTTP(S) resource provider.
//!
//! Fetches are bounded in time and size. The client announces itself as a
//! desktop browser: several signed-URL object stores reject unknown agents.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use specsheet_traits::{ResourceError, ResourceProvider, SharedResourceData};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Settings for [`HttpResourceProvider`].
#[derive(Debug, Clone)]
pub struct HttpFetchOptions {
    /// Upper bound on the whole request, connect through last body byte.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Responses larger than this are rejected.
    pub max_bytes: u64,
}

impl Default for HttpFetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            user_agent: BROWSER_USER_AGENT.to_string(),
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Loads resources over HTTP(S) with a blocking client.
///
/// The blocking client must not be created or used on an async runtime thread;
/// the service drives it from `spawn_blocking` or plain threads.
#[derive(Debug, Clone)]
pub struct HttpResourceProvider {
    client: Client,
    max_bytes: u64,
}

impl HttpResourceProvider {
    /// Builds a provider with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::LoadFailed`] when the HTTP client cannot be constructed.
    pub fn new(options: HttpFetchOptions) -> Result<Self, ResourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("image/*,*/*;q=0.8"));
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .redirect(Policy::limited(5))
            .connect_timeout(options.connect_timeout.min(options.timeout))
            .timeout(options.timeout)
            .build()
            .map_err(|err| ResourceError::LoadFailed {
                path: String::new(),
                message: format!("http client: {err}"),
            })?;
        Ok(Self {
            client,
            max_bytes: options.max_bytes,
        })
    }

    fn map_error(path: &str, err: reqwest::Error) -> ResourceError {
        if err.is_timeout() {
            ResourceError::Timeout(path.to_string())
        } else if let Some(status) = err.status() {
            ResourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            }
        } else {
            ResourceError::LoadFailed {
                path: path.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl ResourceProvider for HttpResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let response = self
            .client
            .get(path)
            .send()
            .map_err(|err| Self::map_error(path, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        if let Some(length) = response.content_length()
            && length > self.max_bytes
        {
            return Err(ResourceError::InvalidFormat(format!(
                "'{path}' is {length} bytes, limit is {}",
                self.max_bytes
            )));
        }

        let mut bytes = Vec::new();
        response
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|err| ResourceError::LoadFailed {
                path: path.to_string(),
                message: err.to_string(),
            })?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(ResourceError::InvalidFormat(format!(
                "'{path}' exceeds {} bytes",
                self.max_bytes
            )));
        }
        Ok(Arc::new(bytes))
    }

    fn exists(&self, path: &str) -> bool {
        self.client
            .head(path)
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "HttpResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_default_options_match_fetch_contract() {
        let options = HttpFetchOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(15));
        assert!(options.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_unreachable_host_fails_fast() {
        let provider = HttpResourceProvider::new(HttpFetchOptions {
            timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
            ..Default::default()
        })
        .unwrap();
        let started = Instant::now();
        let result = provider.load("http://127.0.0.1:9/missing.png");
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}

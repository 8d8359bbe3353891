use std::time::Duration;

use chartsync_core::SyncError;
use url::Url;

use crate::HttpDataService;

/// Builder for [`HttpDataService`].
#[derive(Debug, Clone)]
pub struct HttpDataServiceBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    client: Option<reqwest::Client>,
}

impl HttpDataServiceBuilder {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: None,
            client: None,
        }
    }

    /// Per-request timeout applied by the HTTP client. Defaults to 30 seconds.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Custom `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Use a preconfigured client; `timeout` and `user_agent` are then ignored.
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the service.
    ///
    /// # Errors
    /// Returns `SyncError::InvalidArg` if the base URL does not parse or cannot
    /// carry a path, or if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpDataService, SyncError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| SyncError::InvalidArg(format!("invalid base url {}: {e}", self.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(SyncError::InvalidArg(format!(
                "base url cannot carry a path: {}",
                self.base_url
            )));
        }
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder().timeout(self.timeout);
                if let Some(ua) = self.user_agent {
                    builder = builder.user_agent(ua);
                }
                builder
                    .build()
                    .map_err(|e| SyncError::InvalidArg(format!("http client: {e}")))?
            }
        };
        Ok(HttpDataService { client, base })
    }
}

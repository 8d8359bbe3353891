//! chartsync-http
//!
//! [`DataService`] implementation over the data service's REST API:
//!
//! - `GET {base}/api/{kind}/{symbol}/history?days=&interval=[&nocache=1]`
//! - `GET {base}/api/{kind}/{symbol}/refresh?interval=&candles=`
//! - `GET {base}/api/{kind}/{symbol}/details`
//!
//! Every failure is classified into a [`SyncError`] variant here, so nothing
//! downstream inspects status codes or message text.
#![warn(missing_docs)]

mod builder;
pub mod classify;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use chartsync_core::{
    AssetDetails, AssetRef, DataService, Endpoint, HistoryRequest, HistoryResponse,
    RefreshRequest, RefreshResponse, SyncError,
};

pub use builder::HttpDataServiceBuilder;
pub use classify::{classify_response, classify_transport};

/// HTTP data service client.
#[derive(Debug, Clone)]
pub struct HttpDataService {
    client: reqwest::Client,
    base: Url,
}

impl HttpDataService {
    /// Start building a service rooted at `base_url`.
    pub fn builder(base_url: impl Into<String>) -> HttpDataServiceBuilder {
        HttpDataServiceBuilder::new(base_url)
    }

    /// Service with default client settings.
    ///
    /// # Errors
    /// Returns `SyncError::InvalidArg` if `base_url` is not a usable base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SyncError> {
        Self::builder(base_url).build()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of `endpoint` for `asset`, without query parameters.
    ///
    /// # Errors
    /// Returns `SyncError::InvalidArg` if the base URL cannot carry a path.
    pub fn endpoint_url(&self, asset: &AssetRef, endpoint: Endpoint) -> Result<Url, SyncError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::InvalidArg(format!("base url cannot carry a path: {}", self.base)))?
            .pop_if_empty()
            .extend([
                "api",
                asset.kind.path_segment(),
                asset.symbol.as_str(),
                endpoint.as_str(),
            ]);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        symbol: &str,
        url: Url,
    ) -> Result<T, SyncError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %endpoint, symbol, url = %url, "requesting");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport(endpoint, &e))?;
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<T>()
                .await
                .map_err(|e| classify_transport(endpoint, &e));
        }

        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = resp.text().await.unwrap_or_default();
        let err = classify_response(endpoint, symbol, status.as_u16(), &body, retry_after.as_deref());
        #[cfg(feature = "tracing")]
        tracing::warn!(
            endpoint = %endpoint,
            symbol,
            status = status.as_u16(),
            kind = %err.kind(),
            "request failed"
        );
        Err(err)
    }
}

#[async_trait]
impl DataService for HttpDataService {
    fn name(&self) -> &'static str {
        "chartsync-http"
    }

    async fn history(&self, req: &HistoryRequest) -> Result<HistoryResponse, SyncError> {
        let mut url = self.endpoint_url(&req.asset, Endpoint::History)?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("days", &req.days.to_string());
            q.append_pair("interval", req.effective_interval().as_str());
            if req.bypass_cache {
                q.append_pair("nocache", "1");
            }
        }
        let resp: HistoryResponse = self
            .get_json(Endpoint::History, &req.asset.symbol, url)
            .await?;
        if resp.history.is_empty() {
            return Err(SyncError::empty_history(req.asset.symbol.clone()));
        }
        Ok(resp)
    }

    async fn refresh(&self, req: &RefreshRequest) -> Result<RefreshResponse, SyncError> {
        let mut url = self.endpoint_url(&req.asset, Endpoint::Refresh)?;
        url.query_pairs_mut()
            .append_pair("interval", req.interval.as_str())
            .append_pair("candles", &req.candles().to_string());
        self.get_json(Endpoint::Refresh, &req.asset.symbol, url).await
    }

    async fn details(&self, asset: &AssetRef) -> Result<AssetDetails, SyncError> {
        let url = self.endpoint_url(asset, Endpoint::Details)?;
        self.get_json(Endpoint::Details, &asset.symbol, url).await
    }
}

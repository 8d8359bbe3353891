use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chartsync_core::market_hours::{self, ExchangeProfile, MarketStatus};
use chartsync_core::timeseries::util::with_display_dates;
use chartsync_core::{
    AssetDetails, AssetRef, CandleSeries, ChartPoint, Clock, DataService, Endpoint,
    HistoryRequest, HistoryResponse, IndicatorPoint, IndicatorSettings, RefreshRequest,
    RefreshResponse, SyncConfig, SyncError, SystemClock, Tz, compute_indicators, merge_candles,
    overlay,
};
use tokio::sync::watch;

use super::policy::{RefreshPlan, RefreshTrigger, RetryDirective, plan_refresh, retry_directive};
use super::state::{ViewError, ViewSnapshot};
use crate::market_clock::MarketHoursTicker;
use crate::refresh::AutoRefreshScheduler;
use crate::retry::{RateLimitRetryController, RetryMachine};
use crate::timer::TimerSlot;

struct ViewState {
    snapshot: ViewSnapshot,
    mounted: bool,
    in_flight: usize,
    /// Plan to replay when a rate-limit or error retry fires.
    failed_plan: Option<RefreshPlan>,
    error_retry_used: bool,
    error_retry: TimerSlot,
    /// Auto-refresh stays paused until a manual refresh.
    hold_refresh: bool,
    /// Task following the retry controller's state.
    retry_watch: TimerSlot,
}

struct Inner {
    service: Arc<dyn DataService>,
    asset: AssetRef,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
    retry: RateLimitRetryController,
    scheduler: AutoRefreshScheduler,
    state: Mutex<ViewState>,
    snapshot_tx: watch::Sender<ViewSnapshot>,
}

/// Builder for [`SyncOrchestrator`].
pub struct SyncOrchestratorBuilder {
    service: Arc<dyn DataService>,
    asset: AssetRef,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
}

impl SyncOrchestratorBuilder {
    /// Replace the configuration.
    #[must_use]
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject the clock used for market-hours status.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build an unmounted orchestrator.
    #[must_use]
    pub fn build(self) -> SyncOrchestrator {
        let snapshot = ViewSnapshot::empty(self.asset.clone());
        let (snapshot_tx, _) = watch::channel(snapshot.clone());
        SyncOrchestrator {
            inner: Arc::new(Inner {
                retry: RateLimitRetryController::new(self.config.retry),
                scheduler: AutoRefreshScheduler::new(&self.config.auto_refresh),
                service: self.service,
                asset: self.asset,
                config: self.config,
                clock: self.clock,
                state: Mutex::new(ViewState {
                    snapshot,
                    mounted: false,
                    in_flight: 0,
                    failed_plan: None,
                    error_retry_used: false,
                    error_retry: TimerSlot::new(),
                    hold_refresh: false,
                    retry_watch: TimerSlot::new(),
                }),
                snapshot_tx,
            }),
        }
    }
}

/// Keeps one chart view synchronized with a [`DataService`].
///
/// Composes the rate-limit countdown, the auto-refresh scheduler and the
/// candle merge. Loads run on the ambient Tokio runtime; every change is
/// published as a [`ViewSnapshot`]. Dropping the orchestrator unmounts it.
pub struct SyncOrchestrator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("service", &self.inner.service.name())
            .field("asset", &self.inner.asset)
            .finish_non_exhaustive()
    }
}

impl SyncOrchestrator {
    /// Start building an orchestrator for `asset`.
    #[must_use]
    pub fn builder(service: Arc<dyn DataService>, asset: AssetRef) -> SyncOrchestratorBuilder {
        SyncOrchestratorBuilder {
            service,
            asset,
            config: SyncConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Orchestrator with default configuration and the system clock.
    #[must_use]
    pub fn new(service: Arc<dyn DataService>, asset: AssetRef) -> Self {
        Self::builder(service, asset).build()
    }

    /// Wire the timers, enable auto-refresh per configuration and run the
    /// initial full load. A second call while mounted does nothing.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "chartsync::sync::mount",
            skip(self),
            fields(symbol = %self.inner.asset.symbol),
        )
    )]
    pub async fn mount(&self) {
        let first = self.inner.update(|st| !std::mem::replace(&mut st.mounted, true));
        if !first {
            return;
        }
        self.inner.watch_retry();

        let weak = Arc::downgrade(&self.inner);
        self.inner.retry.set_on_retry(move || {
            if let Some(inner) = weak.upgrade() {
                tokio::spawn(async move { inner.rate_limit_retry().await });
            }
        });
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.set_on_refresh(move || {
            if let Some(inner) = weak.upgrade() {
                tokio::spawn(async move { inner.load(RefreshTrigger::AutoRefresh).await });
            }
        });
        self.inner
            .scheduler
            .set_enabled(self.inner.config.auto_refresh.enabled);

        self.inner.load(RefreshTrigger::InitialLoad).await;
    }

    /// User-initiated refresh.
    ///
    /// Clears any rate-limit countdown and pending error retry, restarts the
    /// auto-refresh countdown and runs a full load.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "chartsync::sync::manual_refresh",
            skip(self),
            fields(symbol = %self.inner.asset.symbol),
        )
    )]
    pub async fn manual_refresh(&self) {
        if !self.inner.lock().mounted {
            return;
        }
        self.inner.retry.cancel();
        self.inner.update(|st| {
            st.error_retry.cancel();
            st.error_retry_used = false;
            st.failed_plan = None;
            st.hold_refresh = false;
            st.snapshot.error = None;
        });
        self.inner.sync_pause();
        self.inner.scheduler.reset();
        self.inner.load(RefreshTrigger::Manual).await;
    }

    /// Run the auto-refresh plan now (lightweight once data is present).
    pub async fn auto_refresh(&self) {
        self.inner.load(RefreshTrigger::AutoRefresh).await;
    }

    /// Stop every timer and ignore results of loads still in flight.
    pub fn unmount(&self) {
        self.inner.unmount();
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Watch snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Candles relabeled into `viewer_zone` joined with the selected indicators.
    #[must_use]
    pub fn chart(&self, settings: &IndicatorSettings, viewer_zone: &str) -> Vec<ChartPoint> {
        let snapshot = self.inner.snapshot_tx.borrow();
        match snapshot.exchange_timezone.as_deref() {
            Some(source) => overlay(
                &with_display_dates(&snapshot.series, source, viewer_zone),
                settings,
            ),
            None => overlay(&snapshot.series, settings),
        }
    }

    /// Indicator values aligned with the current series.
    #[must_use]
    pub fn indicators(&self, settings: &IndicatorSettings) -> Vec<IndicatorPoint> {
        compute_indicators(&self.inner.snapshot_tx.borrow().series, settings)
    }

    /// Trading-hours profile of the asset's exchange, once known.
    #[must_use]
    pub fn exchange_profile(&self) -> Option<&'static ExchangeProfile> {
        let snapshot = self.inner.snapshot_tx.borrow();
        let info = snapshot
            .details
            .as_ref()
            .and_then(|d| d.exchange_info.as_ref());
        let exchange = info.and_then(|i| i.exchange.as_deref());
        let zone = info
            .and_then(|i| i.exchange_timezone.as_deref())
            .or(snapshot.exchange_timezone.as_deref());
        market_hours::lookup(exchange, zone)
    }

    /// Market status as seen from `viewer_zone`, using the injected clock.
    #[must_use]
    pub fn market_status(&self, viewer_zone: Tz) -> Option<MarketStatus> {
        let profile = self.exchange_profile()?;
        market_hours::market_status(profile, self.inner.clock.now(), viewer_zone)
    }

    /// Spawn a minute ticker for the asset's exchange.
    #[must_use]
    pub fn market_ticker(&self, viewer_zone: Tz) -> Option<MarketHoursTicker> {
        let profile = *self.exchange_profile()?;
        Some(MarketHoursTicker::spawn(
            profile,
            viewer_zone,
            Arc::clone(&self.inner.clock),
        ))
    }

    /// Toggle auto-refresh.
    pub fn set_auto_refresh(&self, enabled: bool) {
        self.inner.scheduler.set_enabled(enabled);
    }

    /// True while a rate-limit countdown runs.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.inner.retry.is_rate_limited()
    }

    /// Rate-limit countdown controller.
    #[must_use]
    pub fn retry_controller(&self) -> &RateLimitRetryController {
        &self.inner.retry
    }

    /// Auto-refresh scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &AutoRefreshScheduler {
        &self.inner.scheduler
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }
}

impl Drop for SyncOrchestrator {
    fn drop(&mut self) {
        self.inner.unmount();
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the view state and publish the resulting snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut st = self.lock();
        let out = f(&mut st);
        let snapshot = st.snapshot.clone();
        drop(st);
        self.snapshot_tx.send_replace(snapshot);
        out
    }

    fn unmount(&self) {
        let was_mounted = self.update(|st| {
            st.error_retry.cancel();
            st.retry_watch.cancel();
            st.hold_refresh = false;
            st.snapshot.is_loading = false;
            std::mem::replace(&mut st.mounted, false)
        });
        self.retry.clear_on_retry();
        self.retry.cancel();
        self.scheduler.shutdown();
        if was_mounted {
            #[cfg(feature = "tracing")]
            tracing::debug!(symbol = %self.asset.symbol, "chart view unmounted");
        }
    }

    /// Auto-refresh runs only while no countdown is active and no terminal
    /// hold is in place.
    fn sync_pause(&self) {
        let hold = self.lock().hold_refresh;
        self.scheduler.set_paused(hold || self.retry.is_rate_limited());
    }

    /// Follow the retry controller so a countdown that ends or is cancelled
    /// from any path resumes auto-refresh.
    fn watch_retry(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let mut rx = self.retry.subscribe();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.sync_pause();
            }
        });
        self.lock().retry_watch.install(task);
    }

    async fn rate_limit_retry(self: &Arc<Self>) {
        self.update(|st| {
            if matches!(st.snapshot.error, Some(ViewError::RateLimited { .. })) {
                st.snapshot.error = None;
            }
        });
        self.sync_pause();
        self.load(RefreshTrigger::RateLimitRetry).await;
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "chartsync::sync::load",
            skip(self),
            fields(symbol = %self.asset.symbol, trigger = %trigger),
        )
    )]
    async fn load(self: &Arc<Self>, trigger: RefreshTrigger) {
        let plan = {
            let st = self.lock();
            if !st.mounted {
                return;
            }
            plan_refresh(trigger, st.snapshot.has_data(), st.failed_plan)
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(plan = %plan, "load started");

        self.begin_loading();
        match plan {
            RefreshPlan::Full => self.full_load(trigger).await,
            RefreshPlan::Lightweight => self.lightweight_load().await,
        }
        self.end_loading();
    }

    fn begin_loading(&self) {
        let first = self.update(|st| {
            st.in_flight += 1;
            st.snapshot.is_loading = st.mounted;
            st.in_flight == 1
        });
        if first {
            self.scheduler.set_loading(true);
        }
    }

    fn end_loading(&self) {
        let last = self.update(|st| {
            st.in_flight = st.in_flight.saturating_sub(1);
            if st.in_flight == 0 {
                st.snapshot.is_loading = false;
            }
            st.in_flight == 0
        });
        if last {
            self.scheduler.set_loading(false);
        }
    }

    /// Run one service call under the request timeout, retrying server
    /// timeouts inline.
    async fn guarded<T, F, Fut>(&self, endpoint: Endpoint, mut call: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let policy = self.config.server_timeout;
        let mut retries = 0;
        loop {
            let outcome = tokio::time::timeout(self.config.request_timeout, call())
                .await
                .unwrap_or_else(|_| Err(SyncError::server_timeout(endpoint.as_str())));
            match outcome {
                Err(SyncError::ServerTimeout { .. }) if retries < policy.max_retries => {
                    retries += 1;
                    #[cfg(feature = "tracing")]
                    tracing::debug!(endpoint = %endpoint, attempt = retries, "server timeout; retrying");
                    tokio::time::sleep(policy.delay).await;
                }
                other => return other,
            }
        }
    }

    async fn full_load(self: &Arc<Self>, trigger: RefreshTrigger) {
        let mut request = HistoryRequest::new(self.asset.clone(), self.config.history_days);
        request.bypass_cache = trigger == RefreshTrigger::Manual;
        let service = self.service.as_ref();
        let req = &request;
        let asset = &self.asset;

        let history = async {
            let result = self
                .guarded(Endpoint::History, move || service.history(req))
                .await;
            self.apply_history(req, result);
        };
        let details = async {
            let result = self
                .guarded(Endpoint::Details, move || service.details(asset))
                .await;
            self.apply_details(result);
        };
        futures::future::join(history, details).await;
    }

    async fn lightweight_load(self: &Arc<Self>) {
        let interval = self.lock().snapshot.interval.unwrap_or_else(|| {
            HistoryRequest::new(self.asset.clone(), self.config.history_days).effective_interval()
        });
        let request = RefreshRequest::new(self.asset.clone(), interval)
            .with_candles(self.config.auto_refresh.tail_candles);
        let service = self.service.as_ref();
        let req = &request;
        let result = self
            .guarded(Endpoint::Refresh, move || service.refresh(req))
            .await;
        match result {
            Ok(resp) => self.apply_refresh(resp),
            Err(err) => self.handle_failure(Endpoint::Refresh, RefreshPlan::Lightweight, err, true),
        }
    }

    fn apply_history(
        self: &Arc<Self>,
        request: &HistoryRequest,
        result: Result<HistoryResponse, SyncError>,
    ) {
        let resp = match result {
            Ok(resp) if resp.history.is_empty() => {
                Err(SyncError::empty_history(self.asset.symbol.clone()))
            }
            other => other,
        };
        match resp {
            Ok(resp) => {
                let limited = self.retry.is_rate_limited();
                self.update(|st| {
                    if !st.mounted {
                        return;
                    }
                    let series = adopt_history(&st.snapshot.series, resp.history);
                    st.snapshot.series = series;
                    st.snapshot.currency = Some(resp.currency);
                    st.snapshot.exchange_timezone = Some(resp.exchange_timezone);
                    st.snapshot.interval = resp
                        .interval
                        .as_deref()
                        .and_then(|s| s.parse().ok())
                        .or(Some(request.effective_interval()));
                    settle_success(st, limited);
                });
            }
            Err(err) => self.handle_failure(Endpoint::History, RefreshPlan::Full, err, false),
        }
    }

    fn apply_details(self: &Arc<Self>, result: Result<AssetDetails, SyncError>) {
        match result {
            Ok(details) => self.update(|st| {
                if !st.mounted {
                    return;
                }
                if st.snapshot.currency.is_none() {
                    st.snapshot.currency = Some(details.currency.clone());
                }
                st.snapshot.details = Some(details);
            }),
            Err(err) if matches!(err, SyncError::RateLimit { .. }) => {
                self.handle_failure(Endpoint::Details, RefreshPlan::Full, err, true);
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(symbol = %self.asset.symbol, error = %_err, "details unavailable");
            }
        }
    }

    fn apply_refresh(&self, resp: RefreshResponse) {
        let limited = self.retry.is_rate_limited();
        self.update(|st| {
            if !st.mounted {
                return;
            }
            st.snapshot.series = merge_candles(&st.snapshot.series, &resp.candles);
            if resp.quote.is_some() {
                st.snapshot.quote = resp.quote;
            }
            st.snapshot.last_refresh_ms = Some(resp.timestamp);
            settle_success(st, limited);
        });
    }

    /// Route a failed call per its retry directive.
    ///
    /// Background failures only surface when nothing is displayed yet.
    fn handle_failure(
        self: &Arc<Self>,
        _endpoint: Endpoint,
        plan: RefreshPlan,
        err: SyncError,
        background: bool,
    ) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            symbol = %self.asset.symbol,
            endpoint = %_endpoint,
            plan = %plan,
            kind = %err.kind(),
            error = %err,
            "load failed"
        );
        let directive = retry_directive(&err, &self.config);
        let view_error = ViewError::from_error(&err);
        let mounted = self.update(|st| {
            if !st.mounted {
                return false;
            }
            let has_data = st.snapshot.has_data();
            if !background || !has_data {
                st.snapshot.error = Some(view_error);
            }
            match directive {
                RetryDirective::Countdown { .. } => st.failed_plan = Some(plan),
                RetryDirective::Terminal => {
                    st.failed_plan = None;
                    st.hold_refresh |= !has_data;
                }
                RetryDirective::Exhausted | RetryDirective::RetryOnce { .. } => {}
            }
            true
        });
        if !mounted {
            return;
        }

        match directive {
            RetryDirective::Countdown { wait_seconds } => {
                let needed = RetryMachine::new(self.config.retry).countdown_for(wait_seconds);
                if self.retry.seconds_remaining() < needed {
                    self.retry.start_countdown(wait_seconds);
                }
                self.sync_pause();
            }
            RetryDirective::Terminal => self.sync_pause(),
            RetryDirective::Exhausted => {}
            RetryDirective::RetryOnce { delay } => {
                let schedule = self.update(|st| {
                    if st.error_retry_used {
                        false
                    } else {
                        st.error_retry_used = true;
                        st.failed_plan = Some(plan);
                        true
                    }
                });
                if schedule {
                    self.schedule_error_retry(delay);
                }
            }
        }
    }

    fn schedule_error_retry(self: &Arc<Self>, delay: Duration) {
        let weak = Arc::downgrade(self);
        let mut st = self.lock();
        let generation = st.error_retry.begin();
        st.error_retry.install(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let current = {
                let mut st = inner.lock();
                let current = st.error_retry.is_current(generation);
                if current {
                    st.error_retry.finish();
                }
                current
            };
            if current {
                inner.load(RefreshTrigger::ErrorRetry).await;
            }
        }));
    }
}

/// Clear the error and retry bookkeeping after a successful call, unless a
/// rate-limit countdown is still running.
fn settle_success(st: &mut ViewState, rate_limited: bool) {
    if rate_limited {
        if !matches!(st.snapshot.error, Some(ViewError::RateLimited { .. })) {
            st.snapshot.error = None;
        }
        return;
    }
    st.snapshot.error = None;
    st.failed_plan = None;
    st.error_retry_used = false;
}

/// Take a freshly loaded history, keeping held candles newer than its last one.
fn adopt_history(held: &CandleSeries, fresh: CandleSeries) -> CandleSeries {
    let Some(cutoff) = fresh.last().map(|p| p.timestamp) else {
        return fresh;
    };
    let newer: Vec<_> = held
        .iter()
        .filter(|p| p.timestamp > cutoff)
        .cloned()
        .collect();
    if newer.is_empty() {
        fresh
    } else {
        merge_candles(&fresh, &newer)
    }
}

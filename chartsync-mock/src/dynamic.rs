use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use chartsync_core::{
    AssetDetails, AssetRef, DataService, Endpoint, HistoryRequest, HistoryResponse,
    RefreshRequest, RefreshResponse, SyncError,
};

/// Instruction for how one call should behave.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(SyncError),
    /// Complete with the provided outcome after a delay.
    Delayed(Duration, Result<T, SyncError>),
    /// Hang indefinitely (simulate a stalled request).
    Hang,
}

impl<T> MockBehavior<T> {
    async fn run(self) -> Result<T, SyncError> {
        match self {
            Self::Return(v) => Ok(v),
            Self::Fail(e) => Err(e),
            Self::Delayed(after, outcome) => {
                tokio::time::sleep(after).await;
                outcome
            }
            Self::Hang => std::future::pending().await,
        }
    }
}

/// Scripted behaviors for one endpoint: queued one-shots, then a sticky fallback.
struct Script<T> {
    queue: VecDeque<MockBehavior<T>>,
    fallback: Option<MockBehavior<T>>,
}

impl<T: Clone> Script<T> {
    const fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            fallback: None,
        }
    }

    fn next(&mut self) -> Option<MockBehavior<T>> {
        self.queue.pop_front().or_else(|| self.fallback.clone())
    }
}

struct InternalState {
    history: Script<HistoryResponse>,
    refresh: Script<RefreshResponse>,
    details: Script<AssetDetails>,
    calls: HashMap<Endpoint, usize>,
    history_requests: Vec<HistoryRequest>,
    refresh_requests: Vec<RefreshRequest>,
}

impl InternalState {
    fn new() -> Self {
        Self {
            history: Script::new(),
            refresh: Script::new(),
            details: Script::new(),
            calls: HashMap::new(),
            history_requests: Vec::new(),
            refresh_requests: Vec::new(),
        }
    }
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Queue a one-shot behavior for the next unscripted `history` call.
    pub async fn push_history(&self, behavior: MockBehavior<HistoryResponse>) {
        self.state.lock().await.history.queue.push_back(behavior);
    }

    /// Behavior for `history` calls once the queue is drained.
    pub async fn set_history_fallback(&self, behavior: MockBehavior<HistoryResponse>) {
        self.state.lock().await.history.fallback = Some(behavior);
    }

    /// Queue a one-shot behavior for the next unscripted `refresh` call.
    pub async fn push_refresh(&self, behavior: MockBehavior<RefreshResponse>) {
        self.state.lock().await.refresh.queue.push_back(behavior);
    }

    /// Behavior for `refresh` calls once the queue is drained.
    pub async fn set_refresh_fallback(&self, behavior: MockBehavior<RefreshResponse>) {
        self.state.lock().await.refresh.fallback = Some(behavior);
    }

    /// Queue a one-shot behavior for the next unscripted `details` call.
    pub async fn push_details(&self, behavior: MockBehavior<AssetDetails>) {
        self.state.lock().await.details.queue.push_back(behavior);
    }

    /// Behavior for `details` calls once the queue is drained.
    pub async fn set_details_fallback(&self, behavior: MockBehavior<AssetDetails>) {
        self.state.lock().await.details.fallback = Some(behavior);
    }

    /// Number of calls observed on `endpoint`.
    pub async fn calls(&self, endpoint: Endpoint) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(&endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// Copy of every `history` request received.
    pub async fn history_requests(&self) -> Vec<HistoryRequest> {
        self.state.lock().await.history_requests.clone()
    }

    /// Copy of every `refresh` request received.
    pub async fn refresh_requests(&self) -> Vec<RefreshRequest> {
        self.state.lock().await.refresh_requests.clone()
    }

    /// Clear all scripts, fallbacks and logs.
    pub async fn clear_all_behaviors(&self) {
        *self.state.lock().await = InternalState::new();
    }
}

/// A data service that defers all behavior to an external controller.
///
/// Calls without a scripted or fallback behavior fail with an unclassified
/// error naming the endpoint.
pub struct DynamicMockService {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockService {
    /// Create a new dynamic mock service and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn DataService>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::new()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn DataService>, controller)
    }

    fn unscripted(endpoint: Endpoint) -> SyncError {
        SyncError::unclassified(None, format!("no mock behavior scripted for {endpoint}"))
    }
}

#[async_trait]
impl DataService for DynamicMockService {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn history(&self, req: &HistoryRequest) -> Result<HistoryResponse, SyncError> {
        // Take the behavior without holding the lock across the await below
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.calls.entry(Endpoint::History).or_default() += 1;
            guard.history_requests.push(req.clone());
            guard.history.next()
        };
        match behavior {
            Some(b) => b.run().await,
            None => Err(Self::unscripted(Endpoint::History)),
        }
    }

    async fn refresh(&self, req: &RefreshRequest) -> Result<RefreshResponse, SyncError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.calls.entry(Endpoint::Refresh).or_default() += 1;
            guard.refresh_requests.push(req.clone());
            guard.refresh.next()
        };
        match behavior {
            Some(b) => b.run().await,
            None => Err(Self::unscripted(Endpoint::Refresh)),
        }
    }

    async fn details(&self, _asset: &AssetRef) -> Result<AssetDetails, SyncError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.calls.entry(Endpoint::Details).or_default() += 1;
            guard.details.next()
        };
        match behavior {
            Some(b) => b.run().await,
            None => Err(Self::unscripted(Endpoint::Details)),
        }
    }
}

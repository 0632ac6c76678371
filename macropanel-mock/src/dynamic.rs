use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use macropanel_core::{FetchRequest, PanelError, RawRecord, RecordSource, SourceKind};

/// Instruction for how a fetch should behave for a given dataset.
#[derive(Clone)]
pub enum MockBehavior {
    /// Return the provided records immediately.
    Return(Vec<RawRecord>),
    /// Fail immediately with the provided error.
    Fail(PanelError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<String, MockBehavior>,
    requests: Vec<FetchRequest>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for fetches of a specific dataset.
    pub async fn set_behavior(&self, dataset: impl Into<String>, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.rules.insert(dataset.into(), behavior);
    }

    /// Return a copy of the request log.
    pub async fn requests(&self) -> Vec<FetchRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Clear all configured behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.rules.clear();
        guard.requests.clear();
    }
}

/// A source that defers all behavior to an external controller.
pub struct DynamicMockSource {
    name: &'static str,
    kind: SourceKind,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
        kind: SourceKind,
    ) -> (Arc<dyn RecordSource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, kind, state });
        (me as Arc<dyn RecordSource>, controller)
    }
}

#[async_trait]
impl RecordSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, req: &FetchRequest) -> Result<Vec<RawRecord>, PanelError> {
        // Log and snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req.clone());
            guard.rules.get(&req.dataset).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(records)) => Ok(records),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(PanelError::source_failed(
                self.name,
                format!("no behavior for {}", req.dataset),
            )),
        }
    }
}

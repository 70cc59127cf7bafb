use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

/// Level-triggered cancellation signal shared between an execution and its
/// external controller. Observed by the scheduler before every dispatch and
/// by every in-flight step race.
#[derive(Clone)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Cross-execution table of cancellation handles, keyed by execution id.
/// The only structure shared between concurrent executions.
#[derive(Default)]
pub struct CancellationRegistry {
    handles: DashMap<String, CancelSignal>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register the handle for a new execution.
    pub fn register(&self, execution_id: &str) -> CancelSignal {
        let signal = CancelSignal::new();
        self.handles
            .insert(execution_id.to_string(), signal.clone());
        signal
    }

    pub fn remove(&self, execution_id: &str) {
        self.handles.remove(execution_id);
    }

    /// Trigger cancellation for an execution. Returns false when the id is
    /// unknown (already finished or never registered).
    pub fn cancel(&self, execution_id: &str) -> bool {
        match self.handles.get(execution_id) {
            Some(signal) => {
                signal.trigger();
                true
            }
            None => false,
        }
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.handles.iter().map(|e| e.key().clone()).collect()
    }
}

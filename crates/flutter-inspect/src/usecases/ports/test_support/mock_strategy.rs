use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::EndpointCandidate;
use crate::usecases::ports::DiscoveryStrategy;

pub struct MockStrategy {
    name: &'static str,
    candidates: Vec<EndpointCandidate>,
    calls: Arc<AtomicUsize>,
}

impl MockStrategy {
    pub fn new(name: &'static str, candidates: Vec<EndpointCandidate>) -> Self {
        Self {
            name,
            candidates,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn empty(name: &'static str) -> Self {
        Self::new(name, Vec::new())
    }

    /// Shared invocation counter, readable after the strategy is boxed.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl DiscoveryStrategy for MockStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn discover(&self) -> Vec<EndpointCandidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.candidates.clone()
    }
}

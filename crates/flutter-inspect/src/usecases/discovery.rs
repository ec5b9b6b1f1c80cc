//! Discovery use case: run strategies in order until one finds something.

use crate::domain::EndpointCandidate;
use crate::usecases::ports::DiscoveryStrategy;

pub trait DiscoveryUseCase {
    fn find_endpoints(&self) -> Vec<EndpointCandidate>;

    fn find_first(&self) -> Option<EndpointCandidate> {
        self.find_endpoints().into_iter().next()
    }
}

pub struct DiscoveryCascade {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl DiscoveryCascade {
    pub fn new(strategies: Vec<Box<dyn DiscoveryStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

impl DiscoveryUseCase for DiscoveryCascade {
    /// Later strategies are not consulted once one returns candidates.
    fn find_endpoints(&self) -> Vec<EndpointCandidate> {
        self.strategies
            .iter()
            .map(|strategy| strategy.discover())
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }
}

use crate::domain::EndpointCandidate;

/// One way of locating a running VM service.
///
/// Strategies never fail: anything that goes wrong while looking
/// (missing files, permissions, absent tools) means "nothing found here".
pub trait DiscoveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn discover(&self) -> Vec<EndpointCandidate>;
}

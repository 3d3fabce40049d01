//! Request generations
//!
//! Each remote fetch that ends in a state replacement takes a ticket for the
//! resource it refreshes. When the response arrives, only the holder of the
//! newest ticket for that resource may apply it; older responses are stale.

use gh_client::RepoId;
use std::collections::HashMap;
use std::sync::Mutex;

/// What a fetch refreshes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// All pull requests of one repository
    RepoPulls(RepoId),
    /// A single pull request, by repository and number
    PullRequest(RepoId, u64),
    Notifications,
}

/// Ticket handed out by `RequestGenerations::begin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    resource: Resource,
    value: u64,
}

impl Generation {
    pub fn resource(&self) -> &Resource {
        &self.resource
    }
}

#[derive(Debug, Default)]
pub struct RequestGenerations {
    latest: Mutex<HashMap<Resource, u64>>,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request for `resource`, superseding any in flight
    pub fn begin(&self, resource: Resource) -> Generation {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        let counter = latest.entry(resource.clone()).or_insert(0);
        *counter += 1;
        Generation {
            resource,
            value: *counter,
        }
    }

    /// Whether no newer request for the same resource has started
    pub fn is_latest(&self, generation: &Generation) -> bool {
        let latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        latest.get(&generation.resource) == Some(&generation.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_request_supersedes() {
        let generations = RequestGenerations::new();
        let first = generations.begin(Resource::Notifications);
        let second = generations.begin(Resource::Notifications);

        assert!(!generations.is_latest(&first));
        assert!(generations.is_latest(&second));
    }

    #[test]
    fn test_resources_are_independent() {
        let generations = RequestGenerations::new();
        let a = generations.begin(Resource::RepoPulls("r1".into()));
        let _b = generations.begin(Resource::RepoPulls("r2".into()));
        let _c = generations.begin(Resource::PullRequest("r1".into(), 4));

        assert!(generations.is_latest(&a));
    }
}

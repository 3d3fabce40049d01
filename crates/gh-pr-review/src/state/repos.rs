//! Repository tree state
//!
//! The ordered repository collection plus an index from event id to the
//! pull requests holding that id. The index is kept in step with every
//! structural change so id-addressed operations (`replaceEvent`,
//! `deleteEvent`) can go straight to the affected PRs.

use gh_client::{PullRequest, Repository};
use std::collections::HashMap;

/// Position of a pull request inside the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrLocation {
    pub repo: usize,
    pub pr: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReposState {
    pub(crate) repos: Vec<Repository>,
    event_index: HashMap<String, Vec<PrLocation>>,
}

/// Equality is structural over the collection; the index is derived data
impl PartialEq for ReposState {
    fn eq(&self, other: &Self) -> bool {
        self.repos == other.repos
    }
}

impl ReposState {
    pub fn new(repos: Vec<Repository>) -> Self {
        let mut state = Self {
            repos,
            event_index: HashMap::new(),
        };
        state.rebuild_index();
        state
    }

    pub fn repos(&self) -> &[Repository] {
        &self.repos
    }

    pub fn repo(&self, repo_id: &str) -> Option<&Repository> {
        self.repos.iter().find(|r| r.repo_id == repo_id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &Repository> {
        self.repos.iter().filter(|r| r.selected)
    }

    pub fn pr(&self, repo_id: &str, pr_id: &str) -> Option<&PullRequest> {
        self.repo(repo_id)
            .and_then(|r| r.pull_requests.iter().find(|pr| pr.id == pr_id))
    }

    /// Pull requests whose timeline holds an event with this id
    pub fn event_locations(&self, event_id: &str) -> &[PrLocation] {
        self.event_index
            .get(event_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn locate_repo(&self, repo_id: &str) -> Option<usize> {
        self.repos.iter().position(|r| r.repo_id == repo_id)
    }

    pub(crate) fn locate_pr(&self, repo_id: &str, pr_id: &str) -> Option<PrLocation> {
        let repo = self.locate_repo(repo_id)?;
        let pr = self.repos[repo]
            .pull_requests
            .iter()
            .position(|pr| pr.id == pr_id)?;
        Some(PrLocation { repo, pr })
    }

    pub(crate) fn pr_mut(&mut self, loc: PrLocation) -> &mut PullRequest {
        &mut self.repos[loc.repo].pull_requests[loc.pr]
    }

    pub(crate) fn rebuild_index(&mut self) {
        self.event_index.clear();
        for repo in 0..self.repos.len() {
            self.index_repo(repo);
        }
    }

    /// Re-derive the index entries of one repository's PRs
    pub(crate) fn reindex_repo(&mut self, repo: usize) {
        for locs in self.event_index.values_mut() {
            locs.retain(|loc| loc.repo != repo);
        }
        self.event_index.retain(|_, locs| !locs.is_empty());
        self.index_repo(repo);
    }

    fn index_repo(&mut self, repo: usize) {
        for pr in 0..self.repos[repo].pull_requests.len() {
            self.index_pr(PrLocation { repo, pr });
        }
    }

    pub(crate) fn index_pr(&mut self, loc: PrLocation) {
        let pr = &self.repos[loc.repo].pull_requests[loc.pr];
        for event in &pr.events {
            let locs = self.event_index.entry(event.id.clone()).or_default();
            if !locs.contains(&loc) {
                locs.push(loc);
            }
        }
    }

    pub(crate) fn unindex_pr(&mut self, loc: PrLocation) {
        let pr = &self.repos[loc.repo].pull_requests[loc.pr];
        for event in &pr.events {
            if let Some(locs) = self.event_index.get_mut(&event.id) {
                locs.retain(|l| *l != loc);
                if locs.is_empty() {
                    self.event_index.remove(&event.id);
                }
            }
        }
    }

    pub(crate) fn index_event(&mut self, event_id: &str, loc: PrLocation) {
        let locs = self.event_index.entry(event_id.to_string()).or_default();
        if !locs.contains(&loc) {
            locs.push(loc);
        }
    }

    pub(crate) fn unindex_event(&mut self, event_id: &str, loc: PrLocation) {
        if let Some(locs) = self.event_index.get_mut(event_id) {
            locs.retain(|l| *l != loc);
            if locs.is_empty() {
                self.event_index.remove(event_id);
            }
        }
    }

    /// Drop every index entry for an id, returning where it was
    pub(crate) fn take_event_locations(&mut self, event_id: &str) -> Vec<PrLocation> {
        self.event_index.remove(event_id).unwrap_or_default()
    }
}

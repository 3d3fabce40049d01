//! Snapshot-backed review client
//!
//! Implements `ReviewClient` on top of a JSON snapshot of the hosting
//! service's state. Reads are served from the snapshot; mutations are applied
//! to it and answer with the updated entity, the same way the service would.
//! Used for offline sessions and as a deterministic backend in tests.

use crate::client::ReviewClient;
use crate::types::{
    CommitStatus, Event, EventKind, NewPullRequest, Notifications, Organization, PrFile, PrState,
    Profile, PullRequest, RepoId, Repository, ReviewEvent, SeenState,
};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Serialized service state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Token accepted by `verify` (None = any token)
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub local_repos: Vec<Repository>,
    /// Repositories found by `fetch_remote_repos`
    #[serde(default)]
    pub remote_repos: Vec<Repository>,
    /// Pull requests per repository id
    #[serde(default)]
    pub pull_requests: HashMap<RepoId, Vec<PullRequest>>,
    #[serde(default)]
    pub notifications: Notifications,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    /// Changed files, keyed by `pr_key`
    #[serde(default)]
    pub files: HashMap<String, Vec<PrFile>>,
    /// File contents, keyed by `content_key`
    #[serde(default)]
    pub contents: HashMap<String, String>,
    /// Commit statuses, keyed by `pr_key`
    #[serde(default)]
    pub statuses: HashMap<String, Vec<CommitStatus>>,
}

/// Key for per-PR maps: `<repo_id>#<number>`
pub fn pr_key(repo_id: &str, pr_number: u64) -> String {
    format!("{}#{}", repo_id, pr_number)
}

/// Key for file contents: `<repo_id>@<commit>:<path>`
pub fn content_key(repo_id: &str, commit: &str, path: &str) -> String {
    format!("{}@{}:{}", repo_id, commit, path)
}

impl Snapshot {
    fn events_mut(&mut self) -> impl Iterator<Item = &mut Event> {
        self.pull_requests
            .values_mut()
            .flat_map(|prs| prs.iter_mut())
            .flat_map(|pr| pr.events.iter_mut())
    }

    fn find_event_mut(&mut self, id: &str) -> Option<&mut Event> {
        self.events_mut().find(|e| e.id == id)
    }

    fn find_pr_mut(&mut self, repo_id: &str, pr_id: &str) -> Option<&mut PullRequest> {
        self.pull_requests
            .get_mut(repo_id)
            .and_then(|prs| prs.iter_mut().find(|pr| pr.id == pr_id))
    }

    fn viewer(&self) -> Option<crate::types::Actor> {
        self.profile.as_ref().map(|p| crate::types::Actor {
            login: p.login.clone(),
            avatar_url: p.avatar_url.clone(),
        })
    }
}

/// Review client serving a `Snapshot`
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    snapshot: Arc<Mutex<Snapshot>>,
    /// Where `toggle_repo` persists the snapshot (None = memory only)
    path: Option<PathBuf>,
}

impl SnapshotClient {
    /// Create an in-memory client
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            path: None,
        }
    }

    /// Load a snapshot file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot file {}", path.display()))?;
        debug!(
            "Loaded snapshot with {} local repos from {}",
            snapshot.local_repos.len(),
            path.display()
        );
        Ok(Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Copy of the current snapshot state
    pub fn snapshot(&self) -> anyhow::Result<Snapshot> {
        self.with_snapshot(|s| Ok(s.clone()))
    }

    /// Mutate the served state in place
    pub fn update(&self, f: impl FnOnce(&mut Snapshot)) -> anyhow::Result<()> {
        self.with_snapshot(|s| {
            f(s);
            Ok(())
        })
    }

    fn with_snapshot<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| anyhow!("snapshot lock poisoned"))?;
        f(&mut guard)
    }

    fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = self.with_snapshot(|s| Ok(serde_json::to_string_pretty(&*s)?))?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write snapshot file {}", path.display()))
    }

    fn set_thread_resolved(&self, thread_id: &str, value: bool) -> anyhow::Result<Event> {
        self.with_snapshot(|s| {
            let event = s
                .find_event_mut(thread_id)
                .with_context(|| format!("Review thread {} not found", thread_id))?;
            match &mut event.kind {
                EventKind::ReviewThread { resolved, .. } => *resolved = value,
                _ => bail!("Event {} is not a review thread", thread_id),
            }
            Ok(event.clone())
        })
    }

    fn set_pr_state(&self, pr_id: &str, repo: &Repository, state: PrState) -> anyhow::Result<PullRequest> {
        self.with_snapshot(|s| {
            let pr = s
                .find_pr_mut(&repo.repo_id, pr_id)
                .with_context(|| format!("PR {} not found in {}", pr_id, repo.display_name()))?;
            if pr.state != PrState::Open {
                bail!("PR #{} is not open", pr.number);
            }
            pr.state = state;
            match state {
                PrState::Merged => pr.merged_at = Some(Utc::now()),
                PrState::Closed => pr.closed_at = Some(Utc::now()),
                PrState::Open => {}
            }
            Ok(pr.clone())
        })
    }
}

#[async_trait]
impl ReviewClient for SnapshotClient {
    async fn get_profile(&self) -> anyhow::Result<Profile> {
        self.with_snapshot(|s| s.profile.clone().context("Snapshot has no profile"))
    }

    async fn get_local_repos(&self) -> anyhow::Result<Vec<Repository>> {
        self.with_snapshot(|s| Ok(s.local_repos.clone()))
    }

    async fn get_notifications(&self) -> anyhow::Result<Notifications> {
        self.with_snapshot(|s| Ok(s.notifications.clone()))
    }

    async fn verify(&self, token: &str) -> anyhow::Result<Profile> {
        self.with_snapshot(|s| {
            if let Some(expected) = &s.token {
                if expected != token {
                    bail!("Bad credentials");
                }
            }
            s.profile.clone().context("Snapshot has no profile")
        })
    }

    async fn fetch_organizations(&self) -> anyhow::Result<Vec<Organization>> {
        self.with_snapshot(|s| Ok(s.organizations.clone()))
    }

    async fn fetch_remote_repos(&self, query: &str) -> anyhow::Result<Vec<Repository>> {
        let query = query.to_lowercase();
        self.with_snapshot(|s| {
            Ok(s.remote_repos
                .iter()
                .filter(|r| r.display_name().to_lowercase().contains(&query))
                .cloned()
                .collect())
        })
    }

    async fn fetch_remote_prs(&self, repo: &Repository) -> anyhow::Result<Vec<PullRequest>> {
        debug!("Fetching PRs for {}", repo.display_name());
        self.with_snapshot(|s| {
            Ok(s.pull_requests
                .get(&repo.repo_id)
                .cloned()
                .unwrap_or_default())
        })
    }

    async fn fetch_remote_pr(
        &self,
        repo: &Repository,
        pr_number: u64,
    ) -> anyhow::Result<Option<PullRequest>> {
        self.with_snapshot(|s| {
            Ok(s.pull_requests
                .get(&repo.repo_id)
                .and_then(|prs| prs.iter().find(|pr| pr.number == pr_number))
                .cloned())
        })
    }

    async fn fetch_pr_files(
        &self,
        repo: &Repository,
        pr_number: u64,
    ) -> anyhow::Result<Vec<PrFile>> {
        self.with_snapshot(|s| {
            Ok(s.files
                .get(&pr_key(&repo.repo_id, pr_number))
                .cloned()
                .unwrap_or_default())
        })
    }

    async fn fetch_pr_file(
        &self,
        repo: &Repository,
        path: &str,
        commit: &str,
    ) -> anyhow::Result<String> {
        self.with_snapshot(|s| {
            s.contents
                .get(&content_key(&repo.repo_id, commit, path))
                .cloned()
                .with_context(|| format!("File {} not found at {}", path, commit))
        })
    }

    async fn submit_review(
        &self,
        review_id: &str,
        event: ReviewEvent,
        body: &str,
    ) -> anyhow::Result<Event> {
        self.with_snapshot(|s| {
            let review = s
                .find_event_mut(review_id)
                .with_context(|| format!("Review {} not found", review_id))?;
            match &mut review.kind {
                EventKind::Review {
                    state,
                    body: review_body,
                } => {
                    *state = event.resulting_state();
                    if !body.is_empty() {
                        *review_body = body.to_string();
                    }
                }
                _ => bail!("Event {} is not a review", review_id),
            }
            review.date = Some(Utc::now());
            Ok(review.clone())
        })
    }

    async fn delete_review(&self, review_id: &str) -> anyhow::Result<()> {
        self.with_snapshot(|s| {
            let mut removed = false;
            for pr in s.pull_requests.values_mut().flat_map(|prs| prs.iter_mut()) {
                let before = pr.events.len();
                pr.events.retain(|e| e.id != review_id);
                removed |= pr.events.len() != before;
            }
            if !removed {
                bail!("Review {} not found", review_id);
            }
            Ok(())
        })
    }

    async fn create_review(
        &self,
        pr_id: &str,
        event: ReviewEvent,
        path: Option<&str>,
        position: Option<u32>,
        body: &str,
    ) -> anyhow::Result<Event> {
        debug!(
            "Creating review on {} (anchor: {:?}:{:?})",
            pr_id, path, position
        );
        self.with_snapshot(|s| {
            let mut review = Event::new(
                uuid::Uuid::new_v4().to_string(),
                Utc::now(),
                EventKind::Review {
                    state: event.resulting_state(),
                    body: body.to_string(),
                },
            );
            review.author = s.viewer();
            let pr = s
                .pull_requests
                .values_mut()
                .flat_map(|prs| prs.iter_mut())
                .find(|pr| pr.id == pr_id)
                .with_context(|| format!("PR {} not found", pr_id))?;
            pr.events.push(review.clone());
            Ok(review)
        })
    }

    async fn resolve_thread(&self, thread_id: &str) -> anyhow::Result<Event> {
        self.set_thread_resolved(thread_id, true)
    }

    async fn unresolve_thread(&self, thread_id: &str) -> anyhow::Result<Event> {
        self.set_thread_resolved(thread_id, false)
    }

    async fn mark_as_read(&self, id: &str) -> anyhow::Result<()> {
        self.with_snapshot(|s| {
            s.notifications.set_seen(id, SeenState::Read);
            Ok(())
        })
    }

    async fn mark_as_unread(&self, id: &str) -> anyhow::Result<()> {
        self.with_snapshot(|s| {
            s.notifications.set_seen(id, SeenState::Unread);
            Ok(())
        })
    }

    async fn merge_pr(&self, pr_id: &str, repo: &Repository) -> anyhow::Result<PullRequest> {
        self.set_pr_state(pr_id, repo, PrState::Merged)
    }

    async fn close_pr(&self, pr_id: &str, repo: &Repository) -> anyhow::Result<PullRequest> {
        self.set_pr_state(pr_id, repo, PrState::Closed)
    }

    async fn create_pr(
        &self,
        repo: &Repository,
        new_pr: &NewPullRequest,
    ) -> anyhow::Result<PullRequest> {
        self.with_snapshot(|s| {
            let author = s.viewer();
            let prs = s.pull_requests.entry(repo.repo_id.clone()).or_default();
            let number = prs.iter().map(|pr| pr.number).max().unwrap_or(0) + 1;
            let mut pr = PullRequest::new(uuid::Uuid::new_v4().to_string(), number, &new_pr.title);
            pr.body = new_pr.body.clone();
            pr.base = crate::types::BranchRef::new(&repo.owner, &new_pr.base);
            pr.head = crate::types::BranchRef::new(&repo.owner, &new_pr.head);
            pr.author = author;
            pr.created_at = Some(Utc::now());
            prs.push(pr.clone());
            Ok(pr)
        })
    }

    async fn get_pr_statuses(
        &self,
        pr_number: u64,
        repo: &Repository,
    ) -> anyhow::Result<Vec<CommitStatus>> {
        self.with_snapshot(|s| {
            Ok(s.statuses
                .get(&pr_key(&repo.repo_id, pr_number))
                .cloned()
                .unwrap_or_default())
        })
    }

    async fn toggle_repo(&self, repo: &Repository) -> anyhow::Result<()> {
        self.with_snapshot(|s| {
            match s.local_repos.iter_mut().find(|r| r.repo_id == repo.repo_id) {
                Some(local) => local.selected = !local.selected,
                None => {
                    let mut tracked = repo.clone();
                    tracked.selected = true;
                    tracked.pull_requests.clear();
                    s.local_repos.push(tracked);
                }
            }
            Ok(())
        })?;
        self.save()
    }
}

//! Review client trait
//!
//! This module defines the `ReviewClient` trait, the single seam between the
//! review core and the hosting service. The core never talks to the network
//! itself; it is handed an implementation of this trait.

use crate::types::{
    CommitStatus, Event, NewPullRequest, Notifications, Organization, PrFile, Profile,
    PullRequest, Repository, ReviewEvent,
};
use async_trait::async_trait;

/// Remote review API
///
/// Every call either returns the service's authoritative value or fails with
/// a transport/auth error. Retry policy, if any, belongs to implementations.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks and threads.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{ReviewClient, PullRequest, Repository};
///
/// async fn list_prs(client: &dyn ReviewClient, repo: &Repository) -> anyhow::Result<Vec<PullRequest>> {
///     client.fetch_remote_prs(repo).await
/// }
/// ```
#[async_trait]
pub trait ReviewClient: Send + Sync {
    /// Fetch the authenticated viewer
    async fn get_profile(&self) -> anyhow::Result<Profile>;

    /// Repositories the user tracks on this machine
    async fn get_local_repos(&self) -> anyhow::Result<Vec<Repository>>;

    /// Current notification (read-state) set
    async fn get_notifications(&self) -> anyhow::Result<Notifications>;

    /// Verify an access token and return the profile it belongs to
    async fn verify(&self, token: &str) -> anyhow::Result<Profile>;

    async fn fetch_organizations(&self) -> anyhow::Result<Vec<Organization>>;

    /// Search remote repositories
    async fn fetch_remote_repos(&self, query: &str) -> anyhow::Result<Vec<Repository>>;

    /// Fetch the open pull requests (with timelines) of a repository
    async fn fetch_remote_prs(&self, repo: &Repository) -> anyhow::Result<Vec<PullRequest>>;

    /// Fetch a single pull request by number
    ///
    /// Returns `Ok(None)` when the service has no such PR.
    async fn fetch_remote_pr(
        &self,
        repo: &Repository,
        pr_number: u64,
    ) -> anyhow::Result<Option<PullRequest>>;

    async fn fetch_pr_files(
        &self,
        repo: &Repository,
        pr_number: u64,
    ) -> anyhow::Result<Vec<PrFile>>;

    /// Fetch file content at a given commit
    async fn fetch_pr_file(
        &self,
        repo: &Repository,
        path: &str,
        commit: &str,
    ) -> anyhow::Result<String>;

    // === Review operations ===

    /// Submit a pending review, returning the submitted review event
    async fn submit_review(
        &self,
        review_id: &str,
        event: ReviewEvent,
        body: &str,
    ) -> anyhow::Result<Event>;

    async fn delete_review(&self, review_id: &str) -> anyhow::Result<()>;

    /// Create a review on a pull request
    ///
    /// `path`/`position` anchor the review's first comment to a diff line.
    /// Returns the created review event.
    async fn create_review(
        &self,
        pr_id: &str,
        event: ReviewEvent,
        path: Option<&str>,
        position: Option<u32>,
        body: &str,
    ) -> anyhow::Result<Event>;

    /// Resolve a review thread, returning the updated thread event
    async fn resolve_thread(&self, thread_id: &str) -> anyhow::Result<Event>;

    /// Unresolve a review thread, returning the updated thread event
    async fn unresolve_thread(&self, thread_id: &str) -> anyhow::Result<Event>;

    // === Read state ===

    async fn mark_as_read(&self, id: &str) -> anyhow::Result<()>;

    async fn mark_as_unread(&self, id: &str) -> anyhow::Result<()>;

    // === PR operations ===

    /// Merge a pull request, returning its updated state
    async fn merge_pr(&self, pr_id: &str, repo: &Repository) -> anyhow::Result<PullRequest>;

    /// Close a pull request without merging, returning its updated state
    async fn close_pr(&self, pr_id: &str, repo: &Repository) -> anyhow::Result<PullRequest>;

    async fn create_pr(
        &self,
        repo: &Repository,
        new_pr: &NewPullRequest,
    ) -> anyhow::Result<PullRequest>;

    /// Commit statuses of a PR's head
    async fn get_pr_statuses(
        &self,
        pr_number: u64,
        repo: &Repository,
    ) -> anyhow::Result<Vec<CommitStatus>>;

    /// Persist the tracked/untracked flag of a repository
    async fn toggle_repo(&self, repo: &Repository) -> anyhow::Result<()>;
}

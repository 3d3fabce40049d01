//! Review service client
//!
//! This crate provides the data model shared with the hosting service and a
//! trait-based client for it. The review core depends only on the trait, so
//! the transport can be swapped without touching the store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              ReviewClient trait                  │
//! │  - fetch_remote_prs()                            │
//! │  - submit_review() / create_review()             │
//! │  - merge_pr() / close_pr() / create_pr()         │
//! └─────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!             ┌─────────────────────┐
//!             │  SnapshotClient     │
//!             │  (JSON snapshot)    │
//!             └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{ReviewClient, SnapshotClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = SnapshotClient::load("snapshot.json")?;
//! for repo in client.get_local_repos().await? {
//!     let prs = client.fetch_remote_prs(&repo).await?;
//!     println!("{}: {} open PRs", repo.display_name(), prs.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod snapshot_client;
pub mod types;

pub use client::ReviewClient;
pub use snapshot_client::{content_key, pr_key, Snapshot, SnapshotClient};
pub use types::{
    Actor, BranchRef, CheckState, Comment, CommentId, CommitStatus, Event, EventId, EventKind,
    NewPullRequest, Notification, Notifications, Organization, PrFile, PrId, PrState, Profile,
    PullRequest, RepoId, Repository, ReviewEvent, ReviewState, SeenState,
};

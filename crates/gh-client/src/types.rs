//! Review data transfer objects
//!
//! These types mirror what the hosting service reports for repositories,
//! pull requests and their timelines. The store keeps them as-is: every
//! mutation command dispatches the server's answer, never a client guess.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RepoId = String;
pub type PrId = String;
pub type EventId = String;
pub type CommentId = String;

/// The authenticated viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Login name, compared against event authors
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Author of an event or comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Actor {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            avatar_url: None,
        }
    }
}

/// A repository known to the client, either tracked locally or found remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Stable identifier assigned by the hosting service
    pub repo_id: RepoId,
    /// Owner (user or organization)
    #[serde(default)]
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Whether the user tracks this repository
    #[serde(default)]
    pub selected: bool,
    /// Pull requests, in the order the service reported them
    #[serde(default, alias = "prs")]
    pub pull_requests: Vec<PullRequest>,
}

impl Repository {
    pub fn new(repo_id: impl Into<RepoId>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            owner: owner.into(),
            name: name.into(),
            selected: false,
            pull_requests: Vec::new(),
        }
    }

    /// Display name for the repository (owner/name)
    pub fn display_name(&self) -> String {
        if self.owner.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.owner, self.name)
        }
    }
}

/// Lifecycle state of a pull request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrState {
    #[default]
    Open,
    Closed,
    Merged,
}

/// One side of a pull request (base or head)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    pub owner: String,
    pub ref_name: String,
}

impl BranchRef {
    pub fn new(owner: impl Into<String>, ref_name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ref_name: ref_name.into(),
        }
    }
}

/// A pull request together with its timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Node id, unique within the process
    pub id: PrId,
    /// PR number (e.g., 123)
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub state: PrState,
    #[serde(default)]
    pub base: BranchRef,
    #[serde(default)]
    pub head: BranchRef,
    #[serde(default)]
    pub author: Option<Actor>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    /// Timeline events in server order
    #[serde(default)]
    pub events: Vec<Event>,
}

impl PullRequest {
    pub fn new(id: impl Into<PrId>, number: u64, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            number,
            title: title.into(),
            body: String::new(),
            state: PrState::Open,
            base: BranchRef::default(),
            head: BranchRef::default(),
            author: None,
            url: String::new(),
            created_at: None,
            merged_at: None,
            closed_at: None,
            additions: 0,
            deletions: 0,
            events: Vec::new(),
        }
    }

    /// Branch labels as shown in the header; owners are only spelled out for forks
    pub fn branch_labels(&self) -> (String, String) {
        if self.base.owner == self.head.owner {
            (self.base.ref_name.clone(), self.head.ref_name.clone())
        } else {
            (
                format!("{}:{}", self.base.owner, self.base.ref_name),
                format!("{}:{}", self.head.owner, self.head.ref_name),
            )
        }
    }
}

/// A single comment, either inside a review thread or standalone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub author: Option<Actor>,
    /// Absent when the comment is built locally before the server stamps it
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: String,
}

impl Comment {
    pub fn new(id: impl Into<CommentId>, body: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            author: None,
            date: Some(date),
            body: body.into(),
        }
    }

    pub fn with_author(mut self, login: impl Into<String>) -> Self {
        self.author = Some(Actor::new(login));
        self
    }
}

/// State of a submitted (or pending) review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    #[default]
    Pending,
    Commented,
    Approved,
    ChangesRequested,
    Dismissed,
}

/// A timeline entry of a pull request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique within the owning pull request's timeline
    pub id: EventId,
    #[serde(default)]
    pub author: Option<Actor>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Closed set of timeline variants, tagged by the service's `type` name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    Commit {
        #[serde(default)]
        oid: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        additions: u64,
        #[serde(default)]
        deletions: u64,
    },
    #[serde(rename = "PullRequestReview")]
    Review {
        #[serde(default)]
        state: ReviewState,
        #[serde(default)]
        body: String,
    },
    #[serde(rename = "PullRequestReviewThread")]
    ReviewThread {
        #[serde(default)]
        resolved: bool,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        comments: Vec<Comment>,
    },
    #[serde(rename = "IssueComment", alias = "PullRequestReviewComment")]
    Comment {
        #[serde(default)]
        body: String,
    },
    #[serde(rename = "MergedEvent")]
    Merged {
        #[serde(default)]
        ref_name: String,
    },
    #[serde(rename = "RenamedTitleEvent")]
    RenamedTitle {
        #[serde(default)]
        previous_title: String,
        #[serde(default)]
        current_title: String,
    },
    #[serde(rename = "CrossReferencedEvent", alias = "ReferencedEvent")]
    Reference {
        #[serde(default)]
        source_url: Option<String>,
    },
    /// Any timeline type this client does not model.
    ///
    /// The service's type name is not kept, so this variant serializes back
    /// as `"type": "Unknown"`.
    #[serde(other)]
    Unknown,
}

impl Event {
    pub fn new(id: impl Into<EventId>, date: DateTime<Utc>, kind: EventKind) -> Self {
        Self {
            id: id.into(),
            author: None,
            date: Some(date),
            kind,
        }
    }

    pub fn with_author(mut self, login: impl Into<String>) -> Self {
        self.author = Some(Actor::new(login));
        self
    }

    /// A fresh, unresolved review thread holding a single comment
    pub fn new_thread(comment: Comment) -> Self {
        Self {
            id: format!("thread-{}", comment.id),
            author: comment.author.clone(),
            date: comment.date,
            kind: EventKind::ReviewThread {
                resolved: false,
                path: None,
                comments: vec![comment],
            },
        }
    }

    /// Wire name of the variant
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EventKind::Commit { .. } => "Commit",
            EventKind::Review { .. } => "PullRequestReview",
            EventKind::ReviewThread { .. } => "PullRequestReviewThread",
            EventKind::Comment { .. } => "IssueComment",
            EventKind::Merged { .. } => "MergedEvent",
            EventKind::RenamedTitle { .. } => "RenamedTitleEvent",
            EventKind::Reference { .. } => "CrossReferencedEvent",
            EventKind::Unknown => "Unknown",
        }
    }

    /// Thread comments, if this event is a review thread
    pub fn thread_comments(&self) -> Option<&[Comment]> {
        match &self.kind {
            EventKind::ReviewThread { comments, .. } => Some(comments),
            _ => None,
        }
    }

    /// Who wrote this event; threads are attributed to their first comment
    pub fn effective_author(&self) -> Option<&Actor> {
        match &self.kind {
            EventKind::ReviewThread { comments, .. } => comments
                .first()
                .and_then(|c| c.author.as_ref())
                .or(self.author.as_ref()),
            _ => self.author.as_ref(),
        }
    }
}

/// Whether the viewer has acknowledged an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeenState {
    Read,
    Unread,
}

/// Sparse read-state record for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub event_id: EventId,
    pub seen: SeenState,
}

/// The viewer's notification set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifications {
    /// Events older than this are considered known unless a record says otherwise
    #[serde(default)]
    pub last_acknowledged: Option<DateTime<Utc>>,
    #[serde(default)]
    pub records: Vec<Notification>,
}

impl Notifications {
    pub fn record_for(&self, event_id: &str) -> Option<&Notification> {
        self.records.iter().find(|n| n.event_id == event_id)
    }

    /// Upsert the record for an event
    pub fn set_seen(&mut self, event_id: &str, seen: SeenState) {
        match self.records.iter_mut().find(|n| n.event_id == event_id) {
            Some(record) => record.seen = seen,
            None => self.records.push(Notification {
                event_id: event_id.to_string(),
                seen,
            }),
        }
    }
}

/// Organization the viewer belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A changed file of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrFile {
    pub path: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub patch: Option<String>,
}

/// Overall state of a commit status check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Success,
    Pending,
    Failure,
    Error,
}

/// Individual commit status as reported for a PR head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Status context (e.g., "ci/circleci")
    pub context: String,
    pub state: CheckState,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
}

/// Review submission event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    /// Approve the PR
    Approve,
    /// Request changes on the PR
    RequestChanges,
    /// Comment without approval/rejection
    Comment,
}

impl ReviewEvent {
    /// The review state a submission with this event ends up in
    pub fn resulting_state(self) -> ReviewState {
        match self {
            ReviewEvent::Approve => ReviewState::Approved,
            ReviewEvent::RequestChanges => ReviewState::ChangesRequested,
            ReviewEvent::Comment => ReviewState::Commented,
        }
    }
}

/// Input for opening a new pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPullRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub base: String,
    pub head: String,
}

//! Repository tree actions
//!
//! Structural mutations of the repository -> pull request -> event -> comment
//! hierarchy. Handled by `reducers::repos_reducer`.

use gh_client::{Comment, CommentId, Event, EventId, PrId, PullRequest, RepoId, Repository};
use serde::Deserialize;
use strum::VariantNames;

#[derive(Debug, Clone, Deserialize, VariantNames)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ReposAction {
    /// Replace the whole collection (session start)
    SetRepos { repos: Vec<Repository> },

    /// Flip the `selected` flag of a repository
    ToggleRepo { repo_id: RepoId },

    /// Replace a repository's pull requests wholesale
    #[serde(rename = "registerPRs")]
    #[strum(serialize = "registerPRs")]
    RegisterPrs { repo_id: RepoId, prs: Vec<PullRequest> },

    /// Append an event to one PR's timeline
    #[serde(rename = "addEventToPR")]
    #[strum(serialize = "addEventToPR")]
    AddEventToPr {
        repo_id: RepoId,
        pr_id: PrId,
        event: Event,
    },

    /// Replace an event by id, wherever it lives
    ReplaceEvent { event: Event },

    /// Delete an event by id, wherever it lives
    DeleteEvent { id: EventId },

    #[serde(rename = "replaceEventInPR")]
    #[strum(serialize = "replaceEventInPR")]
    ReplaceEventInPr {
        repo_id: RepoId,
        pr_id: PrId,
        event: Event,
    },

    #[serde(rename = "deleteEventFromPR")]
    #[strum(serialize = "deleteEventFromPR")]
    DeleteEventFromPr {
        repo_id: RepoId,
        pr_id: PrId,
        id: EventId,
    },

    /// Reply to the thread started by `top_comment_id`, or open a new
    /// thread when it is `None`
    #[serde(rename = "addPRReviewComment")]
    #[strum(serialize = "addPRReviewComment")]
    AddPrReviewComment {
        repo_id: RepoId,
        pr_id: PrId,
        top_comment_id: Option<CommentId>,
        comment: Comment,
    },

    #[serde(rename = "replacePRReviewComment")]
    #[strum(serialize = "replacePRReviewComment")]
    ReplacePrReviewComment {
        repo_id: RepoId,
        pr_id: PrId,
        comment: Comment,
    },

    #[serde(rename = "deletePRReviewComment")]
    #[strum(serialize = "deletePRReviewComment")]
    DeletePrReviewComment {
        repo_id: RepoId,
        pr_id: PrId,
        id: CommentId,
    },

    /// Replace a PR by id across all repositories
    #[serde(rename = "replacePR")]
    #[strum(serialize = "replacePR")]
    ReplacePr { pr: PullRequest },

    #[serde(rename = "addPR")]
    #[strum(serialize = "addPR")]
    AddPr { repo_id: RepoId, pr: PullRequest },
}

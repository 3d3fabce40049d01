//! Review commands
//!
//! Each command folds the service's returned event back into the tree;
//! commands that produce a review also mark it as read so the viewer's own
//! activity does not show up as new.

use super::Commands;
use crate::actions::ReposAction;
use crate::error::CommandError;
use crate::reducers::ReposReducer;
use gh_client::{Event, EventId, PrId, RepoId, ReviewEvent};

/// A review to create on a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub event: ReviewEvent,
    pub body: String,
    /// File the first comment is anchored to
    pub path: Option<String>,
    /// Diff position within `path`
    pub position: Option<u32>,
}

impl ReviewDraft {
    pub fn new(event: ReviewEvent, body: impl Into<String>) -> Self {
        Self {
            event,
            body: body.into(),
            path: None,
            position: None,
        }
    }

    pub fn anchored(mut self, path: impl Into<String>, position: u32) -> Self {
        self.path = Some(path.into());
        self.position = Some(position);
        self
    }
}

impl Commands {
    /// Submit a pending review
    ///
    /// If marking the submitted review as read fails, the submission is
    /// already in the store and the error is still returned.
    pub async fn submit_review(
        &self,
        review_id: &str,
        event: ReviewEvent,
        body: &str,
    ) -> Result<Event, CommandError> {
        let review = self
            .client
            .submit_review(review_id, event, body)
            .await
            .map_err(|e| CommandError::transport("submit_review", e))?;
        self.dispatch::<ReposReducer>(ReposAction::ReplaceEvent {
            event: review.clone(),
        })?;
        self.mark_as_read(&review.id).await?;
        Ok(review)
    }

    pub async fn delete_review(&self, review_id: &str) -> Result<(), CommandError> {
        self.client
            .delete_review(review_id)
            .await
            .map_err(|e| CommandError::transport("delete_review", e))?;
        self.dispatch::<ReposReducer>(ReposAction::DeleteEvent {
            id: EventId::from(review_id),
        })?;
        Ok(())
    }

    /// Create a review and append it to the PR's timeline
    pub async fn create_review(
        &self,
        repo_id: &RepoId,
        pr_id: &PrId,
        draft: &ReviewDraft,
    ) -> Result<Event, CommandError> {
        let review = self
            .client
            .create_review(
                pr_id,
                draft.event,
                draft.path.as_deref(),
                draft.position,
                &draft.body,
            )
            .await
            .map_err(|e| CommandError::transport("create_review", e))?;
        self.dispatch::<ReposReducer>(ReposAction::AddEventToPr {
            repo_id: repo_id.clone(),
            pr_id: pr_id.clone(),
            event: review.clone(),
        })?;
        self.mark_as_read(&review.id).await?;
        Ok(review)
    }

    pub async fn resolve_thread(&self, thread_id: &str) -> Result<Event, CommandError> {
        let thread = self
            .client
            .resolve_thread(thread_id)
            .await
            .map_err(|e| CommandError::transport("resolve_thread", e))?;
        self.dispatch::<ReposReducer>(ReposAction::ReplaceEvent {
            event: thread.clone(),
        })?;
        Ok(thread)
    }

    pub async fn unresolve_thread(&self, thread_id: &str) -> Result<Event, CommandError> {
        let thread = self
            .client
            .unresolve_thread(thread_id)
            .await
            .map_err(|e| CommandError::transport("unresolve_thread", e))?;
        self.dispatch::<ReposReducer>(ReposAction::ReplaceEvent {
            event: thread.clone(),
        })?;
        Ok(thread)
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock_client::{fixture, harness, MockClient};
    use super::super::FetchDataRequest;
    use super::*;
    use crate::reducers::NotificationsReducer;
    use gh_client::{EventKind, ReviewState, SeenState};
    use pretty_assertions::assert_eq;

    async fn loaded() -> (std::sync::Arc<MockClient>, Commands) {
        let (client, commands) = harness(fixture());
        commands.initialize().await.unwrap();
        let repos = commands.store().get::<ReposReducer>().unwrap().repos().to_vec();
        commands.fetch_data(FetchDataRequest::all(repos)).await.unwrap();
        (client, commands)
    }

    fn event_in_p1(commands: &Commands, id: &str) -> Option<Event> {
        commands
            .store()
            .get::<ReposReducer>()
            .unwrap()
            .pr("r1", "p1")
            .and_then(|pr| pr.events.iter().find(|e| e.id == id).cloned())
    }

    #[tokio::test]
    async fn test_submit_review_replaces_and_marks_read() {
        let (_, commands) = loaded().await;

        let review = commands
            .submit_review("rev1", ReviewEvent::Approve, "ship it")
            .await
            .unwrap();

        let stored = event_in_p1(&commands, "rev1").unwrap();
        assert_eq!(stored, review);
        assert!(matches!(
            stored.kind,
            EventKind::Review {
                state: ReviewState::Approved,
                ..
            }
        ));
        let notifications = commands.store().get::<NotificationsReducer>().unwrap();
        assert_eq!(notifications.record_for("rev1").unwrap().seen, SeenState::Read);
    }

    #[tokio::test]
    async fn test_submit_review_keeps_event_when_mark_read_fails() {
        let (client, commands) = loaded().await;
        client.fail("mark_as_read");

        let err = commands
            .submit_review("rev1", ReviewEvent::Comment, "")
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Transport { call: "mark_as_read", .. }));
        assert!(matches!(
            event_in_p1(&commands, "rev1").unwrap().kind,
            EventKind::Review {
                state: ReviewState::Commented,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_create_review_appends_to_timeline() {
        let (_, commands) = loaded().await;
        let draft = ReviewDraft::new(ReviewEvent::RequestChanges, "needs tests")
            .anchored("src/lib.rs", 12);

        let review = commands
            .create_review(&"r1".to_string(), &"p1".to_string(), &draft)
            .await
            .unwrap();

        let state = commands.store().get::<ReposReducer>().unwrap();
        let events = &state.pr("r1", "p1").unwrap().events;
        assert_eq!(events.last(), Some(&review));
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn test_delete_review_removes_event() {
        let (_, commands) = loaded().await;

        commands.delete_review("rev1").await.unwrap();

        assert_eq!(event_in_p1(&commands, "rev1"), None);
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_tree() {
        let (client, commands) = loaded().await;
        client.fail("delete_review");
        let before = commands.store().get::<ReposReducer>().unwrap();

        assert!(commands.delete_review("rev1").await.is_err());

        assert_eq!(*commands.store().get::<ReposReducer>().unwrap(), *before);
    }

    #[tokio::test]
    async fn test_resolve_and_unresolve_thread() {
        let (_, commands) = loaded().await;

        commands.resolve_thread("thread-c1").await.unwrap();
        assert!(matches!(
            event_in_p1(&commands, "thread-c1").unwrap().kind,
            EventKind::ReviewThread { resolved: true, .. }
        ));

        commands.unresolve_thread("thread-c1").await.unwrap();
        assert!(matches!(
            event_in_p1(&commands, "thread-c1").unwrap().kind,
            EventKind::ReviewThread {
                resolved: false,
                ..
            }
        ));
    }
}

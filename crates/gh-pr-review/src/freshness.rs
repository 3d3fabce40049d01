//! Freshness - decides whether an event is new to the viewer
//!
//! Rules, in order:
//! 1. events the viewer wrote are never new (threads count as written by
//!    their first comment's author);
//! 2. an explicit read-state record wins;
//! 3. otherwise anything at or after the last acknowledgement is new.
//!
//! With no acknowledgement timestamp and no record, everything is new.
//! An undated event counts as older than any acknowledgement.

use gh_client::{Event, Notifications, Profile, PullRequest, Repository, SeenState};

pub fn is_new_event(event: &Event, notifications: &Notifications, viewer: Option<&Profile>) -> bool {
    if let (Some(viewer), Some(author)) = (viewer, event.effective_author()) {
        if author.login == viewer.login {
            return false;
        }
    }

    if let Some(record) = notifications.record_for(&event.id) {
        return record.seen == SeenState::Unread;
    }

    match (notifications.last_acknowledged, event.date) {
        (None, _) => true,
        (Some(acknowledged), Some(date)) => date >= acknowledged,
        (Some(_), None) => false,
    }
}

/// New events in one pull request's timeline
pub fn count_new_events(
    pr: &PullRequest,
    notifications: &Notifications,
    viewer: Option<&Profile>,
) -> usize {
    pr.events
        .iter()
        .filter(|e| is_new_event(e, notifications, viewer))
        .count()
}

/// New events across every pull request of the given repositories
pub fn total_unread(
    repos: &[Repository],
    notifications: &Notifications,
    viewer: Option<&Profile>,
) -> usize {
    repos
        .iter()
        .flat_map(|r| r.pull_requests.iter())
        .map(|pr| count_new_events(pr, notifications, viewer))
        .sum()
}

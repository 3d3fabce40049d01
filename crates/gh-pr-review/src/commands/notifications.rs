//! Read-state commands

use super::{Commands, Resource};
use crate::actions::NotificationsAction;
use crate::error::CommandError;
use crate::freshness;
use crate::reducers::{NotificationsReducer, ProfileReducer, ReposReducer};

impl Commands {
    /// Mark an event as read, then reload the notification set
    pub async fn mark_as_read(&self, id: &str) -> Result<(), CommandError> {
        self.client
            .mark_as_read(id)
            .await
            .map_err(|e| CommandError::transport("mark_as_read", e))?;
        self.refresh_notifications().await
    }

    /// Mark an event as unread, then reload the notification set
    pub async fn mark_as_unread(&self, id: &str) -> Result<(), CommandError> {
        self.client
            .mark_as_unread(id)
            .await
            .map_err(|e| CommandError::transport("mark_as_unread", e))?;
        self.refresh_notifications().await
    }

    pub async fn refresh_notifications(&self) -> Result<(), CommandError> {
        let generation = self.generations.begin(Resource::Notifications);
        let notifications = self
            .client
            .get_notifications()
            .await
            .map_err(|e| CommandError::transport("get_notifications", e))?;
        if self.accepts(&generation) {
            self.dispatch::<NotificationsReducer>(NotificationsAction::SetNotifications {
                notifications,
            })?;
        }
        Ok(())
    }

    /// New events across all loaded pull requests
    pub fn total_unread(&self) -> Result<usize, CommandError> {
        let repos = self.store.get::<ReposReducer>()?;
        let notifications = self.store.get::<NotificationsReducer>()?;
        let profile = self.store.get::<ProfileReducer>()?;
        Ok(freshness::total_unread(
            repos.repos(),
            &notifications,
            (*profile).as_ref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock_client::{fixture, harness};
    use super::super::FetchDataRequest;
    use super::*;
    use gh_client::SeenState;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_mark_round_trip_updates_count() {
        let (_, commands) = harness(fixture());
        commands.initialize().await.unwrap();
        let selected = commands.store().get::<ReposReducer>().unwrap().repos().to_vec();
        commands.fetch_data(FetchDataRequest::all(selected)).await.unwrap();
        // Thread and comment by bob; the pending review is the viewer's own
        assert_eq!(commands.total_unread().unwrap(), 2);

        commands.mark_as_read("e1").await.unwrap();
        assert_eq!(commands.total_unread().unwrap(), 1);
        let notifications = commands.store().get::<NotificationsReducer>().unwrap();
        assert_eq!(notifications.record_for("e1").unwrap().seen, SeenState::Read);

        commands.mark_as_unread("e1").await.unwrap();
        assert_eq!(commands.total_unread().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_mark_leaves_notifications() {
        let (client, commands) = harness(fixture());
        commands.initialize().await.unwrap();
        let before = commands.store().get::<NotificationsReducer>().unwrap();
        client.fail("mark_as_read");

        assert!(commands.mark_as_read("e1").await.unwrap_err().is_transport());
        assert!(std::sync::Arc::ptr_eq(
            &before,
            &commands.store().get::<NotificationsReducer>().unwrap()
        ));
    }
}

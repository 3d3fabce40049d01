use gh_client::Notifications;
use serde::Deserialize;
use strum::VariantNames;

/// Notification set actions
///
/// The set is only ever replaced wholesale after a re-fetch.
#[derive(Debug, Clone, Deserialize, VariantNames)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum NotificationsAction {
    SetNotifications { notifications: Notifications },
}

use crate::actions::NotificationsAction;
use crate::store::Reducer;
use gh_client::Notifications;

pub struct NotificationsReducer;

impl Reducer for NotificationsReducer {
    const NAME: &'static str = "notifications";
    type State = Notifications;
    type Action = NotificationsAction;

    fn reduce(_state: Notifications, action: &NotificationsAction) -> Notifications {
        match action {
            NotificationsAction::SetNotifications { notifications } => {
                log::debug!("Notification set replaced ({} records)", notifications.records.len());
                notifications.clone()
            }
        }
    }
}

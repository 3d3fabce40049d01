use crate::actions::ProfileAction;
use crate::store::Reducer;
use gh_client::Profile;

/// Viewer identity; `None` until a session is established
pub struct ProfileReducer;

impl Reducer for ProfileReducer {
    const NAME: &'static str = "profile";
    type State = Option<Profile>;
    type Action = ProfileAction;

    fn reduce(_state: Option<Profile>, action: &ProfileAction) -> Option<Profile> {
        match action {
            ProfileAction::SetProfile { profile } => {
                log::info!("Signed in as {}", profile.login);
                Some(profile.clone())
            }
            ProfileAction::ClearProfile {} => None,
        }
    }
}

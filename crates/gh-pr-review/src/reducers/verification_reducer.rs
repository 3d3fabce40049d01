use crate::actions::VerificationAction;
use crate::state::VerificationState;
use crate::store::Reducer;

pub struct VerificationReducer;

impl Reducer for VerificationReducer {
    const NAME: &'static str = "verification";
    type State = VerificationState;
    type Action = VerificationAction;

    fn reduce(_state: VerificationState, action: &VerificationAction) -> VerificationState {
        match action {
            VerificationAction::SetVerification { verifying, error } => VerificationState {
                verifying: *verifying,
                error: error.clone(),
            },
        }
    }
}

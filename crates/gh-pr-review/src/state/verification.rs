/// Progress of an access token check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationState {
    pub verifying: bool,
    pub error: Option<String>,
}

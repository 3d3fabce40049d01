use serde::Deserialize;
use strum::VariantNames;

/// Token verification progress
#[derive(Debug, Clone, Deserialize, VariantNames)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum VerificationAction {
    SetVerification {
        verifying: bool,
        #[serde(default)]
        error: Option<String>,
    },
}

use gh_client::Profile;
use serde::Deserialize;
use strum::VariantNames;

/// Viewer identity actions
#[derive(Debug, Clone, Deserialize, VariantNames)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ProfileAction {
    SetProfile { profile: Profile },
    ClearProfile {},
}

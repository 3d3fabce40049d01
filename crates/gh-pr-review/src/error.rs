//! Error types of the review core
//!
//! `StoreError` covers wiring mistakes (unknown slice/action), which are
//! programmer errors. `CommandError` is what a command hands back to the
//! view: a transport failure, a cancelled invocation, or a store error that
//! bubbled up unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("slice `{0}` is already registered")]
    DuplicateSlice(String),

    #[error("no slice named `{0}`")]
    UnknownSlice(String),

    #[error("slice `{slice}` has no action `{action}`")]
    UnknownAction { slice: String, action: String },

    #[error("invalid payload for `{slice}.{action}`: {source}")]
    InvalidPayload {
        slice: String,
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// A remote call failed; nothing was dispatched for the failing step
    #[error("remote call `{call}` failed: {source}")]
    Transport {
        call: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("command was cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    pub fn transport(call: &'static str, source: anyhow::Error) -> Self {
        log::error!("Remote call {} failed: {:#}", call, source);
        CommandError::Transport { call, source }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, CommandError::Transport { .. })
    }
}

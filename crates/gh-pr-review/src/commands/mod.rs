//! Commands - async operations that talk to the review service
//!
//! A command awaits one or more `ReviewClient` calls and, on success,
//! dispatches actions that fold the authoritative results into the store.
//! A failed remote call dispatches nothing for that step and surfaces as
//! `CommandError::Transport`.
//!
//! Fetches that replace state take a generation ticket first (see
//! `generation`), so a slow response cannot overwrite a newer one.

mod cancel;
mod generation;
mod notifications;
mod pull_request;
mod review;
mod session;

#[cfg(test)]
mod mock_client;

pub use cancel::CancelToken;
pub use generation::{Generation, RequestGenerations, Resource};
pub use review::ReviewDraft;
pub use session::FetchDataRequest;

use crate::error::CommandError;
use crate::store::{Reducer, Store};
use gh_client::ReviewClient;
use gh_pr_config::AppConfig;
use std::sync::Arc;

/// Behaviour switches for the command layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConfig {
    /// Drop completions overtaken by a newer request for the same resource
    pub drop_stale_completions: bool,
    /// Log every fetched PR as pretty JSON
    pub print_prs: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            drop_stale_completions: true,
            print_prs: false,
        }
    }
}

impl From<&AppConfig> for CommandConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            drop_stale_completions: config.drop_stale_completions,
            print_prs: config.print_prs,
        }
    }
}

/// Handle for running commands against a store
#[derive(Clone)]
pub struct Commands {
    client: Arc<dyn ReviewClient>,
    store: Store,
    generations: Arc<RequestGenerations>,
    cancel: CancelToken,
    config: CommandConfig,
}

impl Commands {
    pub fn new(client: Arc<dyn ReviewClient>, store: Store, config: CommandConfig) -> Self {
        Self {
            client,
            store,
            generations: Arc::new(RequestGenerations::new()),
            cancel: CancelToken::new(),
            config,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// A handle sharing this one's store and generations but with its own
    /// cancellation token
    pub fn cancellable(&self) -> (Commands, CancelToken) {
        let token = CancelToken::new();
        let commands = Commands {
            cancel: token.clone(),
            ..self.clone()
        };
        (commands, token)
    }

    fn ensure_active(&self) -> Result<(), CommandError> {
        if self.cancel.is_cancelled() {
            log::debug!("Command cancelled, skipping dispatch");
            return Err(CommandError::Cancelled);
        }
        Ok(())
    }

    fn dispatch<R: Reducer>(&self, action: R::Action) -> Result<Arc<R::State>, CommandError> {
        self.ensure_active()?;
        Ok(self.store.dispatch::<R>(action)?)
    }

    /// Whether a completion holding `generation` may be applied
    fn accepts(&self, generation: &Generation) -> bool {
        if self.generations.is_latest(generation) {
            return true;
        }
        if self.config.drop_stale_completions {
            log::debug!("Dropping stale response for {:?}", generation.resource());
            false
        } else {
            log::debug!("Applying overtaken response for {:?}", generation.resource());
            true
        }
    }
}

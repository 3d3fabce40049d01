//! Session commands: startup, token verification, repository discovery
//! and pull request loading

use super::{Commands, Resource};
use crate::actions::{NotificationsAction, ProfileAction, ReposAction, VerificationAction};
use crate::error::CommandError;
use crate::reducers::{NotificationsReducer, ProfileReducer, ReposReducer, VerificationReducer};
use gh_client::{Organization, Profile, PullRequest, Repository};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Which repositories `fetch_data` loads, plus an optional PR that must be
/// present even if the listing does not include it (e.g. a closed PR opened
/// from a link)
#[derive(Debug, Clone, Default)]
pub struct FetchDataRequest {
    pub repos: Vec<Repository>,
    pub repo_name: Option<String>,
    pub pr_number: Option<u64>,
}

impl FetchDataRequest {
    pub fn all(repos: Vec<Repository>) -> Self {
        Self {
            repos,
            ..Default::default()
        }
    }

    /// Also load `pr_number` of the repository named `repo_name`
    pub fn with_pr(mut self, repo_name: impl Into<String>, pr_number: u64) -> Self {
        self.repo_name = Some(repo_name.into());
        self.pr_number = Some(pr_number);
        self
    }

    fn wants_extra_pr(&self, repo: &Repository) -> Option<u64> {
        let name = self.repo_name.as_deref()?;
        if repo.name == name || repo.display_name() == name {
            self.pr_number
        } else {
            None
        }
    }
}

impl Commands {
    /// Load profile, local repositories and notifications
    ///
    /// All three are fetched before anything is dispatched, so a failure
    /// leaves the store untouched.
    pub async fn initialize(&self) -> Result<(), CommandError> {
        log::info!("Initializing session");
        let profile = self
            .client
            .get_profile()
            .await
            .map_err(|e| CommandError::transport("get_profile", e))?;
        let repos = self
            .client
            .get_local_repos()
            .await
            .map_err(|e| CommandError::transport("get_local_repos", e))?;
        let generation = self.generations.begin(Resource::Notifications);
        let notifications = self
            .client
            .get_notifications()
            .await
            .map_err(|e| CommandError::transport("get_notifications", e))?;

        self.dispatch::<ProfileReducer>(ProfileAction::SetProfile { profile })?;
        self.dispatch::<ReposReducer>(ReposAction::SetRepos { repos })?;
        if self.accepts(&generation) {
            self.dispatch::<NotificationsReducer>(NotificationsAction::SetNotifications {
                notifications,
            })?;
        }
        Ok(())
    }

    /// Check an access token; on success the viewer's profile is stored
    ///
    /// The spinner is always cleared once the call returns, even when the
    /// handle was cancelled in the meantime.
    pub async fn verify(&self, token: &str) -> Result<Profile, CommandError> {
        self.dispatch::<VerificationReducer>(VerificationAction::SetVerification {
            verifying: true,
            error: None,
        })?;

        let outcome = self.client.verify(token).await;
        let error = outcome.as_ref().err().map(|e| format!("{:#}", e));
        self.store
            .dispatch::<VerificationReducer>(VerificationAction::SetVerification {
                verifying: false,
                error,
            })?;

        let profile = outcome.map_err(|e| CommandError::transport("verify", e))?;
        self.dispatch::<ProfileReducer>(ProfileAction::SetProfile {
            profile: profile.clone(),
        })?;
        Ok(profile)
    }

    pub async fn fetch_organizations(&self) -> Result<Vec<Organization>, CommandError> {
        self.client
            .fetch_organizations()
            .await
            .map_err(|e| CommandError::transport("fetch_organizations", e))
    }

    /// Local repositories merged with a remote search
    ///
    /// Remote results already tracked locally are reported as selected;
    /// the rest are appended after the local ones.
    pub async fn fetch_all_repos(&self, query: &str) -> Result<Vec<Repository>, CommandError> {
        let remote = self
            .client
            .fetch_remote_repos(query)
            .await
            .map_err(|e| CommandError::transport("fetch_remote_repos", e))?;
        let mut repos = self
            .client
            .get_local_repos()
            .await
            .map_err(|e| CommandError::transport("get_local_repos", e))?;

        for remote_repo in remote {
            match repos.iter_mut().find(|r| r.repo_id == remote_repo.repo_id) {
                Some(local) => local.selected = true,
                None => repos.push(remote_repo),
            }
        }
        Ok(repos)
    }

    /// Flip a repository's tracked flag locally and persist it in the background
    ///
    /// The returned handle resolves once persistence finished; a persistence
    /// failure is logged and does not roll back the local flip.
    pub fn toggle_repo(&self, repo: &Repository) -> Result<JoinHandle<()>, CommandError> {
        self.dispatch::<ReposReducer>(ReposAction::ToggleRepo {
            repo_id: repo.repo_id.clone(),
        })?;

        let client = Arc::clone(&self.client);
        let repo = repo.clone();
        Ok(tokio::spawn(async move {
            if let Err(e) = client.toggle_repo(&repo).await {
                log::warn!(
                    "Failed to persist tracked flag of {}: {:#}",
                    repo.display_name(),
                    e
                );
            }
        }))
    }

    /// Load the pull requests of each requested repository, in order
    ///
    /// Stops at the first failing repository; repositories before it stay
    /// registered.
    pub async fn fetch_data(&self, request: FetchDataRequest) -> Result<(), CommandError> {
        for repo in &request.repos {
            let generation = self
                .generations
                .begin(Resource::RepoPulls(repo.repo_id.clone()));
            let mut prs = self
                .client
                .fetch_remote_prs(repo)
                .await
                .map_err(|e| CommandError::transport("fetch_remote_prs", e))?;

            if let Some(number) = request.wants_extra_pr(repo) {
                if !prs.iter().any(|pr| pr.number == number) {
                    let extra = self
                        .client
                        .fetch_remote_pr(repo, number)
                        .await
                        .map_err(|e| CommandError::transport("fetch_remote_pr", e))?;
                    match extra {
                        Some(pr) => prs.push(pr),
                        None => log::warn!("PR #{} not found in {}", number, repo.display_name()),
                    }
                }
            }

            if self.config.print_prs {
                for pr in &prs {
                    match serde_json::to_string_pretty(pr) {
                        Ok(json) => log::debug!("{}", json),
                        Err(e) => log::warn!("Failed to serialize PR {}: {}", pr.id, e),
                    }
                }
            }

            if self.accepts(&generation) {
                self.dispatch::<ReposReducer>(ReposAction::RegisterPrs {
                    repo_id: repo.repo_id.clone(),
                    prs,
                })?;
            }
        }
        Ok(())
    }

    /// Refresh a single pull request, adding it if not yet known
    pub async fn fetch_pr(
        &self,
        repo: &Repository,
        pr_number: u64,
    ) -> Result<Option<PullRequest>, CommandError> {
        let generation = self
            .generations
            .begin(Resource::PullRequest(repo.repo_id.clone(), pr_number));
        let Some(pr) = self
            .client
            .fetch_remote_pr(repo, pr_number)
            .await
            .map_err(|e| CommandError::transport("fetch_remote_pr", e))?
        else {
            return Ok(None);
        };

        if self.accepts(&generation) {
            let known = self
                .store
                .get::<ReposReducer>()?
                .pr(&repo.repo_id, &pr.id)
                .is_some();
            let action = if known {
                ReposAction::ReplacePr { pr: pr.clone() }
            } else {
                ReposAction::AddPr {
                    repo_id: repo.repo_id.clone(),
                    pr: pr.clone(),
                }
            };
            self.dispatch::<ReposReducer>(action)?;
        }
        Ok(Some(pr))
    }
}

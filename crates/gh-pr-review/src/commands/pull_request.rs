//! Pull request commands

use super::Commands;
use crate::actions::ReposAction;
use crate::error::CommandError;
use crate::reducers::ReposReducer;
use gh_client::{CommitStatus, NewPullRequest, PrFile, PullRequest, Repository};

impl Commands {
    pub async fn merge_pr(
        &self,
        pr_id: &str,
        repo: &Repository,
    ) -> Result<PullRequest, CommandError> {
        let pr = self
            .client
            .merge_pr(pr_id, repo)
            .await
            .map_err(|e| CommandError::transport("merge_pr", e))?;
        self.dispatch::<ReposReducer>(ReposAction::ReplacePr { pr: pr.clone() })?;
        log::info!("Merged PR #{} in {}", pr.number, repo.display_name());
        Ok(pr)
    }

    pub async fn close_pr(
        &self,
        pr_id: &str,
        repo: &Repository,
    ) -> Result<PullRequest, CommandError> {
        let pr = self
            .client
            .close_pr(pr_id, repo)
            .await
            .map_err(|e| CommandError::transport("close_pr", e))?;
        self.dispatch::<ReposReducer>(ReposAction::ReplacePr { pr: pr.clone() })?;
        Ok(pr)
    }

    /// Open a pull request and append it to the repository
    pub async fn create_pr(
        &self,
        repo: &Repository,
        new_pr: &NewPullRequest,
    ) -> Result<PullRequest, CommandError> {
        let pr = self
            .client
            .create_pr(repo, new_pr)
            .await
            .map_err(|e| CommandError::transport("create_pr", e))?;
        self.dispatch::<ReposReducer>(ReposAction::AddPr {
            repo_id: repo.repo_id.clone(),
            pr: pr.clone(),
        })?;
        log::info!("Opened PR #{} in {}", pr.number, repo.display_name());
        Ok(pr)
    }

    // Read-only lookups: nothing is stored

    pub async fn get_pr_files(
        &self,
        repo: &Repository,
        pr_number: u64,
    ) -> Result<Vec<PrFile>, CommandError> {
        self.client
            .fetch_pr_files(repo, pr_number)
            .await
            .map_err(|e| CommandError::transport("fetch_pr_files", e))
    }

    pub async fn get_pr_file(
        &self,
        repo: &Repository,
        path: &str,
        commit: &str,
    ) -> Result<String, CommandError> {
        self.client
            .fetch_pr_file(repo, path, commit)
            .await
            .map_err(|e| CommandError::transport("fetch_pr_file", e))
    }

    pub async fn get_pr_statuses(
        &self,
        pr_number: u64,
        repo: &Repository,
    ) -> Result<Vec<CommitStatus>, CommandError> {
        self.client
            .get_pr_statuses(pr_number, repo)
            .await
            .map_err(|e| CommandError::transport("get_pr_statuses", e))
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock_client::{fixture, harness};
    use super::super::FetchDataRequest;
    use super::*;
    use gh_client::{pr_key, CheckState, PrState};
    use pretty_assertions::assert_eq;

    async fn loaded_with(snapshot: gh_client::Snapshot) -> (Commands, Repository) {
        let (_, commands) = harness(snapshot);
        commands.initialize().await.unwrap();
        let repos = commands.store().get::<ReposReducer>().unwrap().repos().to_vec();
        commands
            .fetch_data(FetchDataRequest::all(repos.clone()))
            .await
            .unwrap();
        (commands, repos[0].clone())
    }

    #[tokio::test]
    async fn test_merge_replaces_pr() {
        let (commands, api) = loaded_with(fixture()).await;

        commands.merge_pr("p1", &api).await.unwrap();

        let state = commands.store().get::<ReposReducer>().unwrap();
        assert_eq!(state.pr("r1", "p1").unwrap().state, PrState::Merged);
    }

    #[tokio::test]
    async fn test_close_failure_leaves_pr_open() {
        let (commands, api) = loaded_with(fixture()).await;
        commands.merge_pr("p1", &api).await.unwrap();

        // Already merged: the service refuses
        assert!(commands.close_pr("p1", &api).await.is_err());

        let state = commands.store().get::<ReposReducer>().unwrap();
        assert_eq!(state.pr("r1", "p1").unwrap().state, PrState::Merged);
    }

    #[tokio::test]
    async fn test_create_pr_appends() {
        let (commands, api) = loaded_with(fixture()).await;
        let new_pr = NewPullRequest {
            title: "Add lexer".into(),
            body: String::new(),
            base: "main".into(),
            head: "lexer".into(),
        };

        let pr = commands.create_pr(&api, &new_pr).await.unwrap();

        assert_eq!(pr.number, 2);
        let state = commands.store().get::<ReposReducer>().unwrap();
        assert_eq!(state.repo("r1").unwrap().pull_requests.last(), Some(&pr));
    }

    #[tokio::test]
    async fn test_lookups_pass_through() {
        let mut snapshot = fixture();
        snapshot.statuses.insert(
            pr_key("r1", 1),
            vec![CommitStatus {
                context: "ci".into(),
                state: CheckState::Success,
                description: None,
                target_url: None,
            }],
        );
        let (commands, api) = loaded_with(snapshot).await;
        let before = commands.store().get::<ReposReducer>().unwrap();

        let statuses = commands.get_pr_statuses(1, &api).await.unwrap();
        assert_eq!(statuses[0].state, CheckState::Success);
        assert!(commands.get_pr_files(&api, 1).await.unwrap().is_empty());
        assert!(commands.get_pr_file(&api, "README.md", "abc").await.is_err());

        assert!(std::sync::Arc::ptr_eq(
            &before,
            &commands.store().get::<ReposReducer>().unwrap()
        ));
    }
}

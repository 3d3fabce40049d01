//! Test client: a `SnapshotClient` whose calls can be held back or failed

use async_trait::async_trait;
use gh_client::{
    CommitStatus, Event, NewPullRequest, Notifications, Organization, PrFile, Profile,
    PullRequest, Repository, ReviewClient, ReviewEvent, Snapshot, SnapshotClient,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::oneshot;

pub struct MockClient {
    pub inner: SnapshotClient,
    gates: Mutex<HashMap<&'static str, (oneshot::Sender<()>, oneshot::Receiver<()>)>>,
    failing: Mutex<HashSet<&'static str>>,
    hidden: Mutex<HashSet<u64>>,
    calls: Mutex<Vec<&'static str>>,
}

/// A held-back call: `entered` fires once the call is parked, `release`
/// lets it continue
pub struct Gate {
    pub entered: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl Gate {
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl MockClient {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            inner: SnapshotClient::new(snapshot),
            gates: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            hidden: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Hold the next `call` until the gate is released
    pub fn gate(&self, call: &'static str) -> Gate {
        let (entered_tx, entered) = oneshot::channel();
        let (release, release_rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(call, (entered_tx, release_rx));
        Gate { entered, release }
    }

    /// Make every `call` fail
    pub fn fail(&self, call: &'static str) {
        self.failing.lock().unwrap().insert(call);
    }

    /// Leave PR `number` out of repository listings
    pub fn hide_from_listing(&self, number: u64) {
        self.hidden.lock().unwrap().insert(number);
    }

    /// Change the PRs the service holds for a repository
    pub fn edit_pulls(&self, repo_id: &str, f: impl FnOnce(&mut Vec<PullRequest>)) {
        self.inner
            .update(|s| f(s.pull_requests.entry(repo_id.to_string()).or_default()))
            .unwrap();
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: &'static str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gates.lock().unwrap().remove(call);
        if let Some((entered, release)) = gate {
            let _ = entered.send(());
            let _ = release.await;
        }
        if self.failing.lock().unwrap().contains(call) {
            anyhow::bail!("{} unavailable", call);
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewClient for MockClient {
    async fn get_profile(&self) -> anyhow::Result<Profile> {
        self.enter("get_profile").await?;
        self.inner.get_profile().await
    }

    async fn get_local_repos(&self) -> anyhow::Result<Vec<Repository>> {
        self.enter("get_local_repos").await?;
        self.inner.get_local_repos().await
    }

    async fn get_notifications(&self) -> anyhow::Result<Notifications> {
        self.enter("get_notifications").await?;
        self.inner.get_notifications().await
    }

    async fn verify(&self, token: &str) -> anyhow::Result<Profile> {
        self.enter("verify").await?;
        self.inner.verify(token).await
    }

    async fn fetch_organizations(&self) -> anyhow::Result<Vec<Organization>> {
        self.enter("fetch_organizations").await?;
        self.inner.fetch_organizations().await
    }

    async fn fetch_remote_repos(&self, query: &str) -> anyhow::Result<Vec<Repository>> {
        self.enter("fetch_remote_repos").await?;
        self.inner.fetch_remote_repos(query).await
    }

    async fn fetch_remote_prs(&self, repo: &Repository) -> anyhow::Result<Vec<PullRequest>> {
        self.enter("fetch_remote_prs").await?;
        let hidden = self.hidden.lock().unwrap().clone();
        let mut prs = self.inner.fetch_remote_prs(repo).await?;
        prs.retain(|pr| !hidden.contains(&pr.number));
        Ok(prs)
    }

    async fn fetch_remote_pr(
        &self,
        repo: &Repository,
        pr_number: u64,
    ) -> anyhow::Result<Option<PullRequest>> {
        self.enter("fetch_remote_pr").await?;
        self.inner.fetch_remote_pr(repo, pr_number).await
    }

    async fn fetch_pr_files(
        &self,
        repo: &Repository,
        pr_number: u64,
    ) -> anyhow::Result<Vec<PrFile>> {
        self.enter("fetch_pr_files").await?;
        self.inner.fetch_pr_files(repo, pr_number).await
    }

    async fn fetch_pr_file(
        &self,
        repo: &Repository,
        path: &str,
        commit: &str,
    ) -> anyhow::Result<String> {
        self.enter("fetch_pr_file").await?;
        self.inner.fetch_pr_file(repo, path, commit).await
    }

    async fn submit_review(
        &self,
        review_id: &str,
        event: ReviewEvent,
        body: &str,
    ) -> anyhow::Result<Event> {
        self.enter("submit_review").await?;
        self.inner.submit_review(review_id, event, body).await
    }

    async fn delete_review(&self, review_id: &str) -> anyhow::Result<()> {
        self.enter("delete_review").await?;
        self.inner.delete_review(review_id).await
    }

    async fn create_review(
        &self,
        pr_id: &str,
        event: ReviewEvent,
        path: Option<&str>,
        position: Option<u32>,
        body: &str,
    ) -> anyhow::Result<Event> {
        self.enter("create_review").await?;
        self.inner
            .create_review(pr_id, event, path, position, body)
            .await
    }

    async fn resolve_thread(&self, thread_id: &str) -> anyhow::Result<Event> {
        self.enter("resolve_thread").await?;
        self.inner.resolve_thread(thread_id).await
    }

    async fn unresolve_thread(&self, thread_id: &str) -> anyhow::Result<Event> {
        self.enter("unresolve_thread").await?;
        self.inner.unresolve_thread(thread_id).await
    }

    async fn mark_as_read(&self, id: &str) -> anyhow::Result<()> {
        self.enter("mark_as_read").await?;
        self.inner.mark_as_read(id).await
    }

    async fn mark_as_unread(&self, id: &str) -> anyhow::Result<()> {
        self.enter("mark_as_unread").await?;
        self.inner.mark_as_unread(id).await
    }

    async fn merge_pr(&self, pr_id: &str, repo: &Repository) -> anyhow::Result<PullRequest> {
        self.enter("merge_pr").await?;
        self.inner.merge_pr(pr_id, repo).await
    }

    async fn close_pr(&self, pr_id: &str, repo: &Repository) -> anyhow::Result<PullRequest> {
        self.enter("close_pr").await?;
        self.inner.close_pr(pr_id, repo).await
    }

    async fn create_pr(
        &self,
        repo: &Repository,
        new_pr: &NewPullRequest,
    ) -> anyhow::Result<PullRequest> {
        self.enter("create_pr").await?;
        self.inner.create_pr(repo, new_pr).await
    }

    async fn get_pr_statuses(
        &self,
        pr_number: u64,
        repo: &Repository,
    ) -> anyhow::Result<Vec<CommitStatus>> {
        self.enter("get_pr_statuses").await?;
        self.inner.get_pr_statuses(pr_number, repo).await
    }

    async fn toggle_repo(&self, repo: &Repository) -> anyhow::Result<()> {
        self.enter("toggle_repo").await?;
        self.inner.toggle_repo(repo).await
    }
}

pub fn at(minute: u32) -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;
    chrono::Utc
        .with_ymd_and_hms(2024, 3, 1, 12, minute, 0)
        .unwrap()
}

/// Two tracked repositories, one selected, with a PR holding a pending
/// review, a review thread and a comment
pub fn fixture() -> Snapshot {
    use gh_client::{Comment, EventKind, ReviewState};

    let mut api = Repository::new("r1", "acme", "api");
    api.selected = true;
    let web = Repository::new("r2", "acme", "web");

    let mut pr = PullRequest::new("p1", 1, "Add parser");
    pr.events = vec![
        Event::new(
            "rev1",
            at(0),
            EventKind::Review {
                state: ReviewState::Pending,
                body: String::new(),
            },
        )
        .with_author("me"),
        Event::new_thread(Comment::new("c1", "why?", at(1)).with_author("bob")),
        Event::new("e1", at(2), EventKind::Comment { body: "ping".into() }).with_author("bob"),
    ];
    let mut pull_requests = HashMap::new();
    pull_requests.insert("r1".to_string(), vec![pr]);
    pull_requests.insert(
        "r2".to_string(),
        vec![PullRequest::new("p7", 7, "Fix layout")],
    );

    Snapshot {
        token: Some("secret".into()),
        profile: Some(Profile {
            login: "me".into(),
            name: Some("Me".into()),
            avatar_url: None,
        }),
        local_repos: vec![api, web.clone()],
        remote_repos: vec![web, Repository::new("r3", "acme", "cli")],
        pull_requests,
        ..Default::default()
    }
}

/// Commands over a fresh store backed by a `MockClient`
pub fn harness(snapshot: Snapshot) -> (std::sync::Arc<MockClient>, super::Commands) {
    let client = std::sync::Arc::new(MockClient::new(snapshot));
    let store = crate::state::build_store().unwrap();
    let commands = super::Commands::new(client.clone(), store, super::CommandConfig::default());
    (client, commands)
}

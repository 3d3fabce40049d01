use anyhow::Context;
use gh_client::{Event, SnapshotClient};
use gh_pr_config::AppConfig;
use gh_pr_review::commands::{CommandConfig, Commands, FetchDataRequest};
use gh_pr_review::freshness::{count_new_events, is_new_event};
use gh_pr_review::reducers::{reconcile_noops, NotificationsReducer, ProfileReducer, ReposReducer};
use gh_pr_review::state;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let log_file = gh_pr_review::logger::init()?;
    log::info!("Starting gh-pr-review (log: {})", log_file.display());

    let config = AppConfig::load();
    let snapshot_file = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.snapshot_file.clone());
    let client = SnapshotClient::load(&snapshot_file)
        .with_context(|| format!("Cannot open snapshot {}", snapshot_file.display()))?;

    let store = state::build_store()?;
    store.subscribe::<ReposReducer>(|repos| {
        log::debug!("Repository tree updated ({} repos)", repos.repos().len());
    })?;
    store.subscribe::<NotificationsReducer>(|notifications| {
        log::debug!("Notifications updated ({} records)", notifications.records.len());
    })?;

    let commands = Commands::new(Arc::new(client), store.clone(), CommandConfig::from(&config));
    commands.initialize().await?;
    let selected = store.get::<ReposReducer>()?.selected().cloned().collect();
    commands.fetch_data(FetchDataRequest::all(selected)).await?;

    print_summary(&commands, config.dim_known_events)?;

    let noops = reconcile_noops();
    if noops > 0 {
        log::warn!("{} reconcile actions found no target", noops);
    }
    log::info!("Exiting gh-pr-review");
    Ok(())
}

fn print_summary(commands: &Commands, dim_known_events: bool) -> anyhow::Result<()> {
    let store = commands.store();
    let repos = store.get::<ReposReducer>()?;
    let notifications = store.get::<NotificationsReducer>()?;
    let profile = store.get::<ProfileReducer>()?;
    let viewer = (*profile).as_ref();

    if let Some(viewer) = viewer {
        println!("Signed in as {}", viewer.login);
    }

    for repo in repos.selected() {
        println!("{}", repo.display_name());
        for pr in &repo.pull_requests {
            let new = count_new_events(pr, &notifications, viewer);
            let (base, head) = pr.branch_labels();
            println!("  #{} {} ({} <- {}) [{} new]", pr.number, pr.title, base, head, new);
            for event in &pr.events {
                let fresh = is_new_event(event, &notifications, viewer);
                if fresh || !dim_known_events {
                    println!("    {}", describe(event, fresh));
                }
            }
        }
    }

    println!("{} unread", commands.total_unread()?);
    Ok(())
}

fn describe(event: &Event, fresh: bool) -> String {
    let author = event
        .effective_author()
        .map(|a| a.login.as_str())
        .unwrap_or("unknown");
    let date = event
        .date
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "undated".to_string());
    format!(
        "{} {} by {} at {}",
        if fresh { "*" } else { " " },
        event.type_name(),
        author,
        date
    )
}

//! Repos Reducer
//!
//! Collection reconciler for the repository -> pull request -> event ->
//! comment tree. Every action locates its target by id and rebuilds the
//! affected path; everything else is carried over untouched. An action whose
//! target cannot be found leaves the state as it was and is counted as a
//! no-op (see `reconcile_noops`).

use crate::actions::ReposAction;
use crate::state::{PrLocation, ReposState};
use crate::store::Reducer;
use gh_client::{Comment, Event, EventKind, PullRequest, Repository};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NOOPS: AtomicU64 = AtomicU64::new(0);

/// Number of reconcile actions that found no target since process start
pub fn reconcile_noops() -> u64 {
    NOOPS.load(Ordering::Relaxed)
}

fn no_op(action: &str, reason: fmt::Arguments<'_>) {
    NOOPS.fetch_add(1, Ordering::Relaxed);
    log::warn!(target: "gh_pr_review::reconcile", "{}: {}, state unchanged", action, reason);
}

pub struct ReposReducer;

impl Reducer for ReposReducer {
    const NAME: &'static str = "repos";
    type State = ReposState;
    type Action = ReposAction;

    fn reduce(state: ReposState, action: &ReposAction) -> ReposState {
        reduce_repos(state, action)
    }
}

/// Reduce the repository tree
pub fn reduce_repos(state: ReposState, action: &ReposAction) -> ReposState {
    match action {
        ReposAction::SetRepos { repos } => set_repos(repos),
        ReposAction::ToggleRepo { repo_id } => toggle_repo(state, repo_id),
        ReposAction::RegisterPrs { repo_id, prs } => register_prs(state, repo_id, prs),
        ReposAction::AddEventToPr {
            repo_id,
            pr_id,
            event,
        } => add_event_to_pr(state, repo_id, pr_id, event),
        ReposAction::ReplaceEvent { event } => replace_event(state, event),
        ReposAction::DeleteEvent { id } => delete_event(state, id),
        ReposAction::ReplaceEventInPr {
            repo_id,
            pr_id,
            event,
        } => replace_event_in_pr(state, repo_id, pr_id, event),
        ReposAction::DeleteEventFromPr { repo_id, pr_id, id } => {
            delete_event_from_pr(state, repo_id, pr_id, id)
        }
        ReposAction::AddPrReviewComment {
            repo_id,
            pr_id,
            top_comment_id,
            comment,
        } => add_pr_review_comment(state, repo_id, pr_id, top_comment_id.as_deref(), comment),
        ReposAction::ReplacePrReviewComment {
            repo_id,
            pr_id,
            comment,
        } => replace_pr_review_comment(state, repo_id, pr_id, comment),
        ReposAction::DeletePrReviewComment { repo_id, pr_id, id } => {
            delete_pr_review_comment(state, repo_id, pr_id, id)
        }
        ReposAction::ReplacePr { pr } => replace_pr(state, pr),
        ReposAction::AddPr { repo_id, pr } => add_pr(state, repo_id, pr),
    }
}

fn set_repos(repos: &[Repository]) -> ReposState {
    log::debug!("Replacing repository collection ({} repos)", repos.len());
    ReposState::new(repos.to_vec())
}

fn toggle_repo(mut state: ReposState, repo_id: &str) -> ReposState {
    let Some(repo_idx) = state.locate_repo(repo_id) else {
        no_op("toggleRepo", format_args!("repository {} not found", repo_id));
        return state;
    };
    let repo = &mut state.repos[repo_idx];
    repo.selected = !repo.selected;
    log::debug!(
        "Repository {} is now {}",
        repo.display_name(),
        if repo.selected { "selected" } else { "unselected" }
    );
    state
}

fn register_prs(mut state: ReposState, repo_id: &str, prs: &[PullRequest]) -> ReposState {
    let Some(repo_idx) = state.locate_repo(repo_id) else {
        no_op("registerPRs", format_args!("repository {} not found", repo_id));
        return state;
    };
    state.repos[repo_idx].pull_requests = prs.to_vec();
    state.reindex_repo(repo_idx);
    log::info!("Registered {} PRs for repository {}", prs.len(), repo_id);
    state
}

fn add_event_to_pr(mut state: ReposState, repo_id: &str, pr_id: &str, event: &Event) -> ReposState {
    let Some(loc) = state.locate_pr(repo_id, pr_id) else {
        no_op(
            "addEventToPR",
            format_args!("PR {} not found in repository {}", pr_id, repo_id),
        );
        return state;
    };
    let events = &mut state.pr_mut(loc).events;
    match events.iter_mut().find(|e| e.id == event.id) {
        // Ids are unique per timeline; a second add of the same id replaces it
        Some(existing) => *existing = event.clone(),
        None => events.push(event.clone()),
    }
    state.index_event(&event.id, loc);
    state
}

fn replace_event(mut state: ReposState, event: &Event) -> ReposState {
    let locations = state.event_locations(&event.id).to_vec();
    if locations.is_empty() {
        no_op("replaceEvent", format_args!("event {} not found", event.id));
        return state;
    }
    for loc in locations {
        for existing in state.pr_mut(loc).events.iter_mut() {
            if existing.id == event.id {
                *existing = event.clone();
            }
        }
    }
    state
}

fn delete_event(mut state: ReposState, id: &str) -> ReposState {
    let locations = state.take_event_locations(id);
    if locations.is_empty() {
        no_op("deleteEvent", format_args!("event {} not found", id));
        return state;
    }
    for loc in locations {
        state.pr_mut(loc).events.retain(|e| e.id != id);
    }
    state
}

fn replace_event_in_pr(
    mut state: ReposState,
    repo_id: &str,
    pr_id: &str,
    event: &Event,
) -> ReposState {
    let Some(loc) = state.locate_pr(repo_id, pr_id) else {
        no_op(
            "replaceEventInPR",
            format_args!("PR {} not found in repository {}", pr_id, repo_id),
        );
        return state;
    };
    match state.pr_mut(loc).events.iter_mut().find(|e| e.id == event.id) {
        Some(existing) => *existing = event.clone(),
        None => no_op(
            "replaceEventInPR",
            format_args!("event {} not found in PR {}", event.id, pr_id),
        ),
    }
    state
}

fn delete_event_from_pr(mut state: ReposState, repo_id: &str, pr_id: &str, id: &str) -> ReposState {
    let Some(loc) = state.locate_pr(repo_id, pr_id) else {
        no_op(
            "deleteEventFromPR",
            format_args!("PR {} not found in repository {}", pr_id, repo_id),
        );
        return state;
    };
    let events = &mut state.pr_mut(loc).events;
    let before = events.len();
    events.retain(|e| e.id != id);
    if events.len() == before {
        no_op(
            "deleteEventFromPR",
            format_args!("event {} not found in PR {}", id, pr_id),
        );
        return state;
    }
    state.unindex_event(id, loc);
    state
}

fn add_pr_review_comment(
    mut state: ReposState,
    repo_id: &str,
    pr_id: &str,
    top_comment_id: Option<&str>,
    comment: &Comment,
) -> ReposState {
    let Some(loc) = state.locate_pr(repo_id, pr_id) else {
        no_op(
            "addPRReviewComment",
            format_args!("PR {} not found in repository {}", pr_id, repo_id),
        );
        return state;
    };

    let Some(top_comment_id) = top_comment_id else {
        let thread = Event::new_thread(comment.clone());
        let events = &mut state.pr_mut(loc).events;
        if events.iter().any(|e| e.id == thread.id) {
            no_op(
                "addPRReviewComment",
                format_args!("thread {} already exists in PR {}", thread.id, pr_id),
            );
            return state;
        }
        let thread_id = thread.id.clone();
        events.push(thread);
        state.index_event(&thread_id, loc);
        log::debug!("Opened review thread {} on PR {}", thread_id, pr_id);
        return state;
    };

    let mut appended = 0;
    for event in state.pr_mut(loc).events.iter_mut() {
        if let EventKind::ReviewThread { comments, .. } = &mut event.kind {
            if comments.first().is_some_and(|c| c.id == top_comment_id) {
                comments.push(comment.clone());
                appended += 1;
            }
        }
    }
    if appended == 0 {
        no_op(
            "addPRReviewComment",
            format_args!("no thread starts with comment {} in PR {}", top_comment_id, pr_id),
        );
    }
    state
}

/// Apply `f` to the comment list of every review thread in one PR,
/// returning how many comments it reported as touched
fn update_thread_comments(
    state: &mut ReposState,
    loc: PrLocation,
    mut f: impl FnMut(&mut Vec<Comment>) -> usize,
) -> usize {
    state
        .pr_mut(loc)
        .events
        .iter_mut()
        .map(|event| match &mut event.kind {
            EventKind::ReviewThread { comments, .. } => f(comments),
            _ => 0,
        })
        .sum()
}

fn replace_pr_review_comment(
    mut state: ReposState,
    repo_id: &str,
    pr_id: &str,
    comment: &Comment,
) -> ReposState {
    let Some(loc) = state.locate_pr(repo_id, pr_id) else {
        no_op(
            "replacePRReviewComment",
            format_args!("PR {} not found in repository {}", pr_id, repo_id),
        );
        return state;
    };
    let replaced = update_thread_comments(&mut state, loc, |comments| {
        let mut n = 0;
        for existing in comments.iter_mut().filter(|c| c.id == comment.id) {
            *existing = comment.clone();
            n += 1;
        }
        n
    });
    if replaced == 0 {
        no_op(
            "replacePRReviewComment",
            format_args!("comment {} not found in PR {}", comment.id, pr_id),
        );
    }
    state
}

fn delete_pr_review_comment(
    mut state: ReposState,
    repo_id: &str,
    pr_id: &str,
    id: &str,
) -> ReposState {
    let Some(loc) = state.locate_pr(repo_id, pr_id) else {
        no_op(
            "deletePRReviewComment",
            format_args!("PR {} not found in repository {}", pr_id, repo_id),
        );
        return state;
    };
    let removed = update_thread_comments(&mut state, loc, |comments| {
        let before = comments.len();
        comments.retain(|c| c.id != id);
        before - comments.len()
    });
    if removed == 0 {
        no_op(
            "deletePRReviewComment",
            format_args!("comment {} not found in PR {}", id, pr_id),
        );
    }
    state
}

fn replace_pr(mut state: ReposState, pr: &PullRequest) -> ReposState {
    let locations: Vec<PrLocation> = state
        .repos
        .iter()
        .enumerate()
        .flat_map(|(repo, r)| {
            r.pull_requests
                .iter()
                .enumerate()
                .filter(move |(_, existing)| existing.id == pr.id)
                .map(move |(idx, _)| PrLocation { repo, pr: idx })
        })
        .collect();
    if locations.is_empty() {
        no_op("replacePR", format_args!("PR {} not found", pr.id));
        return state;
    }
    for loc in locations {
        swap_pr(&mut state, loc, pr);
    }
    state
}

fn add_pr(mut state: ReposState, repo_id: &str, pr: &PullRequest) -> ReposState {
    let Some(repo_idx) = state.locate_repo(repo_id) else {
        no_op("addPR", format_args!("repository {} not found", repo_id));
        return state;
    };
    if let Some(loc) = state.locate_pr(repo_id, &pr.id) {
        log::debug!("addPR: PR {} already present in {}, replacing", pr.id, repo_id);
        swap_pr(&mut state, loc, pr);
        return state;
    }
    let prs = &mut state.repos[repo_idx].pull_requests;
    prs.push(pr.clone());
    let loc = PrLocation {
        repo: repo_idx,
        pr: prs.len() - 1,
    };
    state.index_pr(loc);
    state
}

fn swap_pr(state: &mut ReposState, loc: PrLocation, pr: &PullRequest) {
    state.unindex_pr(loc);
    *state.pr_mut(loc) = pr.clone();
    state.index_pr(loc);
}

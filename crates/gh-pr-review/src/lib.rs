//! Reactive review core
//!
//! A store of named state slices, a reconciler that keeps the
//! repository -> pull request -> event -> comment tree in step with the
//! review service, async commands that bridge the service and the store,
//! and the rules deciding which events are new to the viewer.
//!
//! ```rust,no_run
//! use gh_client::SnapshotClient;
//! use gh_pr_review::commands::{CommandConfig, Commands, FetchDataRequest};
//! use gh_pr_review::reducers::ReposReducer;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = gh_pr_review::state::build_store()?;
//! let client = Arc::new(SnapshotClient::load("snapshot.json")?);
//! let commands = Commands::new(client, store.clone(), CommandConfig::default());
//!
//! commands.initialize().await?;
//! let selected = store.get::<ReposReducer>()?.selected().cloned().collect();
//! commands.fetch_data(FetchDataRequest::all(selected)).await?;
//! println!("{} unread", commands.total_unread()?);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod commands;
pub mod error;
pub mod freshness;
pub mod logger;
pub mod reducers;
pub mod state;
pub mod store;

pub use error::{CommandError, StoreError};
pub use store::{Reducer, SliceValue, Store, SubscriptionToken};

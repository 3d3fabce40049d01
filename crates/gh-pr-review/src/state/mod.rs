//! Slice states and store wiring
//!
//! `build_store` registers every slice the review core knows about with its
//! initial value.

pub mod repos;
pub mod verification;

pub use repos::{PrLocation, ReposState};
pub use verification::VerificationState;

use crate::error::StoreError;
use crate::reducers::{NotificationsReducer, ProfileReducer, ReposReducer, VerificationReducer};
use crate::store::Store;
use gh_client::Notifications;

/// Register all slices on an existing store
pub fn register_slices(store: &Store) -> Result<(), StoreError> {
    store.register_slice::<ReposReducer>(ReposState::default())?;
    store.register_slice::<ProfileReducer>(None)?;
    store.register_slice::<NotificationsReducer>(Notifications::default())?;
    store.register_slice::<VerificationReducer>(VerificationState::default())?;
    Ok(())
}

/// A store with every slice registered and empty
pub fn build_store() -> Result<Store, StoreError> {
    let store = Store::new();
    register_slices(&store)?;
    Ok(store)
}

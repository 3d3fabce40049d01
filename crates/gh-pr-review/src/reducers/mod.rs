pub mod notifications_reducer;
pub mod profile_reducer;
pub mod repos_reducer;
pub mod verification_reducer;

pub use notifications_reducer::NotificationsReducer;
pub use profile_reducer::ProfileReducer;
pub use repos_reducer::{reconcile_noops, ReposReducer};
pub use verification_reducer::VerificationReducer;

//! Actions module
//!
//! One closed action enum per slice. Variant names double as the slice's
//! action table for name-based dispatch: `{"action": "<name>", "payload": {...}}`.

pub mod notifications;
pub mod profile;
pub mod repos;
pub mod verification;

pub use notifications::NotificationsAction;
pub use profile::ProfileAction;
pub use repos::ReposAction;
pub use verification::VerificationAction;

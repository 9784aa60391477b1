//! Users domain module.
//!
//! Business rules for users, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod user;

pub use user::{NewUser, User, UserChanges};

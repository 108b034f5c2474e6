//! User module - Accounts, roles and credentials.
//!
//! # Domain Invariants
//!
//! 1. Usernames are unique across all users
//! 2. Only password hashes are stored, never plaintext
//! 3. Super admins cannot be created, deactivated or demoted
//! 4. State transitions that change nothing are rejected

mod criteria;
mod errors;
mod events;
mod password;
mod role;
mod service;
mod user;
mod username;

pub use criteria::{UserChanges, UserCriteria, UserSortField};
pub use errors::{TransitionRejection, UserError};
pub use events::{
    AdminGranted, AdminRevoked, UserActivated, UserCreated, UserDeactivated, UserPasswordChanged,
};
pub use password::{PasswordHashError, PasswordHasher, RawPassword, UserPasswordHash};
pub use role::UserRole;
pub use service::UserService;
pub use user::User;
pub use username::Username;

//! User application handlers.
//!
//! Commands that create and modify user accounts, and the admin listing
//! query.

mod activate_user;
mod change_password;
mod create_user;
mod deactivate_user;
mod grant_admin;
mod list_users;
mod revoke_admin;

pub use activate_user::{ActivateUserCommand, ActivateUserHandler};
pub use change_password::{ChangePasswordCommand, ChangePasswordHandler};
pub use create_user::{CreateUserCommand, CreateUserHandler, CreateUserResult};
pub use deactivate_user::{DeactivateUserCommand, DeactivateUserHandler};
pub use grant_admin::{GrantAdminCommand, GrantAdminHandler};
pub use list_users::{ListUsersHandler, ListUsersQuery, ListUsersResult};
pub use revoke_admin::{RevokeAdminCommand, RevokeAdminHandler};

use crate::application::errors::AppError;
use crate::domain::user::{User, UserError, Username};
use crate::ports::UserCommandGateway;

/// Loads the user a command targets.
///
/// # Errors
///
/// - `DomainField` when `username` is malformed
/// - `UserNotFoundByUsername` when nobody holds it
async fn load_target(users: &dyn UserCommandGateway, username: &str) -> Result<User, AppError> {
    let username = Username::new(username)?;
    users
        .read_by_username(&username)
        .await?
        .ok_or_else(|| UserError::UserNotFoundByUsername(username.into_inner()).into())
}

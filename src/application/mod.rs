//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers
//! (read); the mediator routes every request to its handler.

pub mod authorization;
pub mod context;
pub mod current_user;
pub mod errors;
pub mod handlers;
pub mod mediator;
pub mod transaction;
pub mod user_gateway;

pub use context::RequestContext;
pub use errors::AppError;
pub use handlers::meeting::JoinMeetingCommand;
pub use handlers::user::{
    ActivateUserCommand, ChangePasswordCommand, CreateUserCommand, CreateUserResult,
    DeactivateUserCommand, GrantAdminCommand, ListUsersQuery, ListUsersResult,
    RevokeAdminCommand,
};
pub use mediator::{Mediator, MediatorBuilder, RequestKind};

//! Application handlers.
//!
//! One handler per command or query. Each handler is built fresh for every
//! dispatch by [`TransactionalHandlerFactory`] and runs inside its own
//! transaction scope.

pub mod factory;
pub mod meeting;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use factory::{AppServices, HandlerScope, ScopedHandler, TransactionalHandlerFactory};

//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `Repository<E>` - Generic entity persistence bound to a unit of work
//! - `UnitOfWork` - Transaction lifecycle and repository issuance
//! - `UserCommandGateway` / `UserQueryGateway` - User write and read paths
//!
//! ## Identity Ports
//!
//! - `IdentityProvider` - Who is calling
//! - `AccessRevoker` - Terminate a user's sessions
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events

mod access_revoker;
mod event_publisher;
mod identity_provider;
mod query_params;
mod repository;
mod unit_of_work;
mod user_command_gateway;
mod user_query_gateway;

pub use access_revoker::AccessRevoker;
pub use event_publisher::{EventPublisher, PublishError};
pub use identity_provider::{AuthenticationError, IdentityProvider};
pub use query_params::{Pagination, PaginationError, Sorting, SortingError, SortingOrder};
pub use repository::{DataMapperError, Persistable, Repository};
pub use unit_of_work::{
    AppUnitOfWork, FlushError, RepositoryFactory, TransactionStatus, UnitOfWork,
    UnitOfWorkFactory,
};
pub use user_command_gateway::UserCommandGateway;
pub use user_query_gateway::{UserListParams, UserQueryGateway, UserQueryModel};

//! Identity and access adapters.
//!
//! Implementations of the `IdentityProvider` and `AccessRevoker` ports:
//!
//! - `identity` - Fixed caller identity, for tests and embedders
//! - `access` - In-memory record of who holds live access

mod access;
mod identity;

pub use access::InMemoryAccessRevoker;
pub use identity::StaticIdentityProvider;

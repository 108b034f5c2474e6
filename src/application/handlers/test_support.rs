//! Shared fixture for handler tests, backed by the in-memory adapters.

use std::sync::Arc;

use super::factory::{AppServices, HandlerScope, ScopedHandler};
use crate::adapters::auth::{InMemoryAccessRevoker, StaticIdentityProvider};
use crate::adapters::memory::{
    InMemoryDatabase, InMemoryUnitOfWork, InMemoryUnitOfWorkFactory, InMemoryUserReader,
};
use crate::application::context::RequestContext;
use crate::application::mediator::EventRecorder;
use crate::domain::foundation::UserId;
use crate::domain::user::{
    PasswordHashError, PasswordHasher, RawPassword, User, UserCriteria, UserPasswordHash,
    UserRole, Username,
};
use crate::ports::{Repository, RepositoryFactory, UnitOfWork, UnitOfWorkFactory};

/// Deterministic hasher so tests can assert on stored hashes.
pub(crate) struct PrefixHasher;

impl PasswordHasher for PrefixHasher {
    fn hash(&self, raw: &RawPassword) -> Result<UserPasswordHash, PasswordHashError> {
        Ok(UserPasswordHash::new(format!("hashed:{}", raw.expose())))
    }

    fn verify(&self, raw: &RawPassword, hash: &UserPasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_str() == format!("hashed:{}", raw.expose()))
    }
}

/// A seeded store, an acting user, and a begun unit of work.
pub(crate) struct Fixture {
    pub db: InMemoryDatabase,
    pub revoker: Arc<InMemoryAccessRevoker>,
    scope: HandlerScope,
}

impl Fixture {
    pub const ACTOR: &'static str = "actor1";

    pub async fn acting_as(role: UserRole) -> Self {
        let db = InMemoryDatabase::new();
        let actor = seed_into(&db, Self::ACTOR, role, true).await;
        Self::build(db, StaticIdentityProvider::authenticated(actor.id())).await
    }

    pub async fn anonymous() -> Self {
        Self::build(InMemoryDatabase::new(), StaticIdentityProvider::anonymous()).await
    }

    async fn build(db: InMemoryDatabase, identity: StaticIdentityProvider) -> Self {
        let revoker = Arc::new(InMemoryAccessRevoker::new());
        let services = AppServices {
            uow_factory: Arc::new(InMemoryUnitOfWorkFactory::new(db.clone())),
            user_reader: Arc::new(InMemoryUserReader::new(db.clone())),
            password_hasher: Arc::new(PrefixHasher),
        };
        let ctx = RequestContext::new(Arc::new(identity), revoker.clone());

        let uow = services.uow_factory.create();
        uow.begin().await.unwrap();
        let scope = HandlerScope::new(&services, &ctx, uow, Arc::new(EventRecorder::new()));

        Self { db, revoker, scope }
    }

    pub fn handler<H: ScopedHandler>(&self) -> H {
        H::build(&self.scope)
    }

    /// The dependencies handlers are built from, for wiring test doubles.
    pub fn scope(&self) -> &HandlerScope {
        &self.scope
    }

    /// Commits a user directly to the store.
    pub async fn seed(&self, username: &str, role: UserRole, is_active: bool) -> User {
        seed_into(&self.db, username, role, is_active).await
    }

    /// Reads committed state through a separate unit of work.
    pub async fn stored_user(&self, username: &str) -> Option<User> {
        let uow = InMemoryUnitOfWork::new(self.db.clone());
        uow.begin().await.unwrap();
        let repo: Arc<dyn Repository<User>> = uow.repository();
        let user = repo
            .one(&UserCriteria::by_username(Username::new(username).unwrap()))
            .await
            .unwrap();
        uow.rollback().await.unwrap();
        user
    }

    /// Drains the events recorded so far.
    pub fn event_types(&self) -> Vec<String> {
        self.scope
            .events
            .take()
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }
}

async fn seed_into(
    db: &InMemoryDatabase,
    username: &str,
    role: UserRole,
    is_active: bool,
) -> User {
    let password = RawPassword::new("seeded").unwrap();
    let user = User::new(
        UserId::new(),
        Username::new(username).unwrap(),
        PrefixHasher.hash(&password).unwrap(),
        role,
        is_active,
    );

    let uow = InMemoryUnitOfWork::new(db.clone());
    uow.begin().await.unwrap();
    let repo: Arc<dyn Repository<User>> = uow.repository();
    repo.create(&user).await.unwrap();
    uow.commit().await.unwrap();
    user
}

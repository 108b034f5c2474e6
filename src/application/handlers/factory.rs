//! Transactional handler factory.
//!
//! Each dispatch gets a fresh unit of work, a fresh handler wired to it,
//! and a transaction scope around the handler's work.

use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::application::context::RequestContext;
use crate::application::current_user::CurrentUserService;
use crate::application::errors::AppError;
use crate::application::mediator::{
    Dispatchable, EventRecorder, HandlerFactory, Request, Response,
};
use crate::application::transaction;
use crate::application::user_gateway::RepositoryUserGateway;
use crate::domain::foundation::EventEnvelope;
use crate::domain::user::{PasswordHasher, UserService};
use crate::ports::{
    AccessRevoker, AppUnitOfWork, UnitOfWorkFactory, UserCommandGateway, UserQueryGateway,
};

/// Long-lived services shared by every dispatch.
#[derive(Clone)]
pub struct AppServices {
    pub uow_factory: Arc<dyn UnitOfWorkFactory>,
    pub user_reader: Arc<dyn UserQueryGateway>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

/// Everything a handler may depend on for one dispatch.
pub struct HandlerScope {
    pub uow: Arc<dyn AppUnitOfWork>,
    pub users: Arc<dyn UserCommandGateway>,
    pub user_reader: Arc<dyn UserQueryGateway>,
    pub current_user: CurrentUserService,
    pub access_revoker: Arc<dyn AccessRevoker>,
    pub user_service: Arc<UserService>,
    pub events: Arc<EventRecorder>,
}

impl HandlerScope {
    pub fn new(
        services: &AppServices,
        ctx: &RequestContext,
        uow: Arc<dyn AppUnitOfWork>,
        events: Arc<EventRecorder>,
    ) -> Self {
        let users: Arc<dyn UserCommandGateway> =
            Arc::new(RepositoryUserGateway::new(uow.repository()));
        let current_user =
            CurrentUserService::new(ctx.identity_provider(), users.clone(), ctx.access_revoker());

        Self {
            uow,
            users,
            user_reader: services.user_reader.clone(),
            current_user,
            access_revoker: ctx.access_revoker(),
            user_service: Arc::new(UserService::new(services.password_hasher.clone())),
            events,
        }
    }
}

/// A handler built per dispatch from a [`HandlerScope`].
#[async_trait]
pub trait ScopedHandler: Send + Sync + Sized + 'static {
    type Request: Dispatchable;

    fn build(scope: &HandlerScope) -> Self;

    async fn run(
        &self,
        request: Self::Request,
    ) -> Result<<Self::Request as Dispatchable>::Output, AppError>;
}

/// [`HandlerFactory`] that runs `H` inside a transaction scope.
pub struct TransactionalHandlerFactory<H> {
    services: AppServices,
    _handler: PhantomData<fn() -> H>,
}

impl<H: ScopedHandler> TransactionalHandlerFactory<H> {
    pub fn new(services: AppServices) -> Self {
        Self {
            services,
            _handler: PhantomData,
        }
    }
}

#[async_trait]
impl<H: ScopedHandler> HandlerFactory for TransactionalHandlerFactory<H> {
    async fn dispatch(
        &self,
        ctx: &RequestContext,
        request: Request,
        events: Arc<EventRecorder>,
    ) -> Result<Response, AppError> {
        let request = H::Request::from_request(request)?;
        let uow = self.services.uow_factory.create();
        let scope = HandlerScope::new(&self.services, ctx, uow.clone(), events);
        let handler = H::build(&scope);

        let output = transaction::scoped(uow.as_ref(), handler.run(request)).await?;
        Ok(H::Request::into_response(output))
    }
}

/// Stamps `envelope` with the acting user and records it.
pub(crate) fn record(events: &EventRecorder, envelope: EventEnvelope, actor: &str) {
    events.record(envelope.with_user_id(actor));
}

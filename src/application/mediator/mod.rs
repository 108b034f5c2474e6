//! Mediator - routes typed requests to their registered handlers.
//!
//! # Dispatch
//!
//! ```text
//! send(ctx, request)
//!   -> lookup factory by RequestKind
//!   -> middleware chain
//!   -> factory builds a fresh handler and runs it
//!   -> recorded events published
//! ```
//!
//! The registration table is built once at startup through
//! [`MediatorBuilder`] and is read-only afterwards.

mod events;
mod middleware;
mod request;

pub use events::EventRecorder;
pub use middleware::{LoggingMiddleware, Middleware, Next};
pub use request::{Dispatchable, Request, RequestKind, Response};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use super::context::RequestContext;
use super::errors::AppError;
use crate::ports::EventPublisher;

/// Creates and runs the handler for one request kind.
///
/// A factory builds a new handler on every dispatch, so handlers never
/// share transactional state across requests.
#[async_trait]
pub trait HandlerFactory: Send + Sync {
    async fn dispatch(
        &self,
        ctx: &RequestContext,
        request: Request,
        events: Arc<EventRecorder>,
    ) -> Result<Response, AppError>;
}

/// Misconfigured registration table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("A handler is already registered for '{0}'")]
    DuplicateHandler(RequestKind),

    #[error("No handler registered for {0:?}")]
    MissingHandlers(Vec<RequestKind>),
}

pub struct MediatorBuilder {
    handlers: HashMap<RequestKind, Arc<dyn HandlerFactory>>,
    middleware: Vec<Arc<dyn Middleware>>,
    publisher: Arc<dyn EventPublisher>,
}

impl MediatorBuilder {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            handlers: HashMap::new(),
            middleware: Vec::new(),
            publisher,
        }
    }

    /// Binds `factory` to `kind`.
    ///
    /// # Errors
    ///
    /// `DuplicateHandler` when `kind` is already bound.
    pub fn register(
        mut self,
        kind: RequestKind,
        factory: Arc<dyn HandlerFactory>,
    ) -> Result<Self, RegistrationError> {
        if self.handlers.contains_key(&kind) {
            return Err(RegistrationError::DuplicateHandler(kind));
        }
        self.handlers.insert(kind, factory);
        Ok(self)
    }

    /// Appends a middleware. The first one added runs outermost.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Builds the mediator, allowing unregistered kinds.
    pub fn build(self) -> Mediator {
        Mediator {
            handlers: self.handlers,
            middleware: self.middleware,
            publisher: self.publisher,
        }
    }

    /// Builds the mediator, failing when any request kind has no handler.
    pub fn build_complete(self) -> Result<Mediator, RegistrationError> {
        let missing: Vec<RequestKind> = RequestKind::ALL
            .into_iter()
            .filter(|kind| !self.handlers.contains_key(kind))
            .collect();
        if !missing.is_empty() {
            return Err(RegistrationError::MissingHandlers(missing));
        }
        Ok(self.build())
    }
}

pub struct Mediator {
    handlers: HashMap<RequestKind, Arc<dyn HandlerFactory>>,
    middleware: Vec<Arc<dyn Middleware>>,
    publisher: Arc<dyn EventPublisher>,
}

impl Mediator {
    /// Dispatches a typed request and returns its typed output.
    pub async fn send<R: Dispatchable>(
        &self,
        ctx: &RequestContext,
        request: R,
    ) -> Result<R::Output, AppError> {
        let response = self.dispatch(ctx, request.into_request()).await?;
        R::from_response(response)
    }

    /// Dispatches an untyped request.
    ///
    /// # Errors
    ///
    /// `HandlerNotRegistered` when no factory is bound to the request kind,
    /// otherwise whatever the handler returns.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        request: Request,
    ) -> Result<Response, AppError> {
        let kind = request.kind();
        let factory = self
            .handlers
            .get(&kind)
            .ok_or(AppError::HandlerNotRegistered(kind))?;

        let events = Arc::new(EventRecorder::new());
        let response = Next::new(&self.middleware, factory.as_ref(), &events)
            .run(ctx, request)
            .await?;

        self.publish(ctx, kind, events.take()).await;
        Ok(response)
    }

    pub fn is_registered(&self, kind: RequestKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    async fn publish(
        &self,
        ctx: &RequestContext,
        kind: RequestKind,
        events: Vec<crate::domain::foundation::EventEnvelope>,
    ) {
        if events.is_empty() {
            return;
        }
        let count = events.len();
        let events = events
            .into_iter()
            .map(|event| match event.metadata.correlation_id {
                Some(_) => event,
                None => event.with_correlation_id(ctx.correlation_id()),
            })
            .collect();

        match self.publisher.publish_all(events).await {
            Ok(()) => debug!(request = %kind, count, "Published domain events"),
            Err(err) => error!(
                request = %kind,
                correlation_id = ctx.correlation_id(),
                error = %err,
                "Failed to publish domain events"
            ),
        }
    }
}

//! Middleware chain wrapped around every dispatch.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::events::EventRecorder;
use super::request::{Request, Response};
use super::HandlerFactory;
use crate::application::context::RequestContext;
use crate::application::errors::AppError;

/// A step that runs before and after the rest of the chain.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(
        &self,
        ctx: &RequestContext,
        request: Request,
        next: Next<'_>,
    ) -> Result<Response, AppError>;
}

/// The remainder of the chain, ending at the handler factory.
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    factory: &'a dyn HandlerFactory,
    events: &'a Arc<EventRecorder>,
}

impl<'a> Next<'a> {
    pub(super) fn new(
        middleware: &'a [Arc<dyn Middleware>],
        factory: &'a dyn HandlerFactory,
        events: &'a Arc<EventRecorder>,
    ) -> Self {
        Self {
            middleware,
            factory,
            events,
        }
    }

    pub async fn run(self, ctx: &RequestContext, request: Request) -> Result<Response, AppError> {
        match self.middleware.split_first() {
            Some((first, rest)) => {
                let next = Next {
                    middleware: rest,
                    factory: self.factory,
                    events: self.events,
                };
                first.handle(ctx, request, next).await
            }
            None => {
                self.factory
                    .dispatch(ctx, request, Arc::clone(self.events))
                    .await
            }
        }
    }
}

/// Logs every dispatch with its kind, correlation id, duration and outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        ctx: &RequestContext,
        request: Request,
        next: Next<'_>,
    ) -> Result<Response, AppError> {
        let kind = request.kind();
        let started = Instant::now();
        info!(
            request = %kind,
            correlation_id = ctx.correlation_id(),
            source = ctx.source().unwrap_or("unknown"),
            "Dispatching request"
        );

        let result = next.run(ctx, request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(
                request = %kind,
                correlation_id = ctx.correlation_id(),
                elapsed_ms,
                "Request completed"
            ),
            Err(err) if err.is_client_error() => warn!(
                request = %kind,
                correlation_id = ctx.correlation_id(),
                elapsed_ms,
                code = %err.code(),
                error = %err,
                "Request rejected"
            ),
            Err(err) => error!(
                request = %kind,
                correlation_id = ctx.correlation_id(),
                elapsed_ms,
                code = %err.code(),
                error = %err,
                "Request failed"
            ),
        }

        result
    }
}

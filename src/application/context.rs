//! Per-request environment handed to the mediator.
//!
//! The boundary layer builds one `RequestContext` per incoming call. It
//! carries the identity handles for that caller plus tracing metadata, so
//! handlers never reach for ambient state.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::ports::{AccessRevoker, IdentityProvider};

#[derive(Clone)]
pub struct RequestContext {
    identity_provider: Arc<dyn IdentityProvider>,
    access_revoker: Arc<dyn AccessRevoker>,
    correlation_id: String,
    source: Option<String>,
}

impl RequestContext {
    /// Creates a context with a freshly generated correlation id.
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        access_revoker: Arc<dyn AccessRevoker>,
    ) -> Self {
        Self {
            identity_provider,
            access_revoker,
            correlation_id: Uuid::new_v4().to_string(),
            source: None,
        }
    }

    /// Builder: Use a correlation id propagated from upstream.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = id.into();
        self
    }

    /// Builder: Add source identifier (e.g. "api", "cli", "scheduler").
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn identity_provider(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.identity_provider)
    }

    pub fn access_revoker(&self) -> Arc<dyn AccessRevoker> {
        Arc::clone(&self.access_revoker)
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("correlation_id", &self.correlation_id)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::ports::{AuthenticationError, DataMapperError};
    use async_trait::async_trait;

    struct Anonymous;

    #[async_trait]
    impl IdentityProvider for Anonymous {
        async fn current_user_id(&self) -> Result<UserId, AuthenticationError> {
            Err(AuthenticationError::NotAuthenticated)
        }
    }

    struct NoopRevoker;

    #[async_trait]
    impl AccessRevoker for NoopRevoker {
        async fn remove_all_user_access(&self, _user_id: UserId) -> Result<(), DataMapperError> {
            Ok(())
        }
    }

    fn context() -> RequestContext {
        RequestContext::new(Arc::new(Anonymous), Arc::new(NoopRevoker))
    }

    #[test]
    fn generates_distinct_correlation_ids() {
        assert_ne!(context().correlation_id(), context().correlation_id());
    }

    #[test]
    fn builders_override_metadata() {
        let ctx = context().with_correlation_id("corr-7").with_source("cli");
        assert_eq!(ctx.correlation_id(), "corr-7");
        assert_eq!(ctx.source(), Some("cli"));
    }

    #[tokio::test]
    async fn exposes_identity_provider() {
        let result = context().identity_provider().current_user_id().await;
        assert_eq!(result, Err(AuthenticationError::NotAuthenticated));
    }
}

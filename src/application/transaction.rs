//! Scoped transaction acquisition.

use std::fmt::Display;
use std::future::Future;
use tracing::error;

use crate::ports::{DataMapperError, UnitOfWork};

/// Runs `work` inside a transaction on `uow`.
///
/// Begins before polling `work`. On `Ok` the transaction is committed,
/// which is a no-op when the work already committed. On `Err` it is rolled
/// back; a failing rollback is logged and the original error returned.
///
/// Dropping the returned future mid-flight leaves the transaction
/// uncommitted, and adapters discard uncommitted work when released.
pub async fn scoped<U, T, E, F>(uow: &U, work: F) -> Result<T, E>
where
    U: UnitOfWork + ?Sized,
    E: From<DataMapperError> + Display,
    F: Future<Output = Result<T, E>>,
{
    uow.begin().await?;

    let outcome = match work.await {
        Ok(value) => uow.commit().await.map(|()| value).map_err(E::from),
        Err(err) => Err(err),
    };

    if let Err(err) = &outcome {
        if let Err(rollback_err) = uow.rollback().await {
            error!(
                error = %err,
                rollback_error = %rollback_err,
                "Rollback failed after handler error"
            );
        }
    }

    outcome
}

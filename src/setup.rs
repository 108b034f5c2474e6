//! Application wiring.
//!
//! Builds the process-wide pieces from [`AppConfig`]: tracing, the
//! connection pool, migrations, and a mediator with every request kind
//! bound to its handler.

use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::adapters::postgres::{PostgresUnitOfWorkFactory, PostgresUserReader};
use crate::adapters::security::Argon2PasswordHasher;
use crate::application::handlers::meeting::JoinMeetingHandler;
use crate::application::handlers::user::{
    ActivateUserHandler, ChangePasswordHandler, CreateUserHandler, DeactivateUserHandler,
    GrantAdminHandler, ListUsersHandler, RevokeAdminHandler,
};
use crate::application::handlers::{AppServices, ScopedHandler, TransactionalHandlerFactory};
use crate::application::mediator::{
    Dispatchable, LoggingMiddleware, Mediator, MediatorBuilder, RegistrationError,
};
use crate::config::{AppConfig, ConfigError, DatabaseConfig, ServerConfig};
use crate::domain::user::PasswordHashError;
use crate::ports::EventPublisher;

/// Failure while assembling the application.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid log filter: {0}")]
    LogFilter(String),

    #[error("Failed to create connection pool: {0}")]
    Pool(#[from] sqlx::Error),

    #[error("Failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid password hashing parameters: {0}")]
    Hashing(#[from] PasswordHashError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured filter. Calling this twice is
/// harmless; the second subscriber is ignored.
pub fn init_tracing(config: &ServerConfig) -> Result<(), SetupError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| SetupError::LogFilter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logs {
        registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}

/// Creates the connection pool. Connections open on first use.
pub fn build_pool(config: &DatabaseConfig) -> Result<PgPool, SetupError> {
    Ok(config.pool_options().connect_lazy(&config.url)?)
}

/// Applies pending migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), SetupError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

fn bind<H>(builder: MediatorBuilder, services: &AppServices) -> Result<MediatorBuilder, RegistrationError>
where
    H: ScopedHandler,
{
    builder.register(
        <H::Request as Dispatchable>::KIND,
        Arc::new(TransactionalHandlerFactory::<H>::new(services.clone())),
    )
}

/// Binds every request kind to its handler, with request logging.
///
/// # Errors
///
/// `RegistrationError` if a kind is bound twice or left unbound.
pub fn build_mediator(
    services: AppServices,
    publisher: Arc<dyn EventPublisher>,
) -> Result<Mediator, RegistrationError> {
    let builder = MediatorBuilder::new(publisher).with_middleware(Arc::new(LoggingMiddleware));
    let builder = bind::<CreateUserHandler>(builder, &services)?;
    let builder = bind::<ChangePasswordHandler>(builder, &services)?;
    let builder = bind::<ActivateUserHandler>(builder, &services)?;
    let builder = bind::<DeactivateUserHandler>(builder, &services)?;
    let builder = bind::<GrantAdminHandler>(builder, &services)?;
    let builder = bind::<RevokeAdminHandler>(builder, &services)?;
    let builder = bind::<ListUsersHandler>(builder, &services)?;
    let builder = bind::<JoinMeetingHandler>(builder, &services)?;
    builder.build_complete()
}

/// A wired application backed by PostgreSQL.
pub struct Application {
    pub config: AppConfig,
    pub pool: PgPool,
    pub mediator: Mediator,
}

impl Application {
    /// Validates `config`, then builds the pool, optionally migrates, and
    /// registers every handler.
    pub async fn build(
        config: AppConfig,
        publisher: Arc<dyn EventPublisher>,
    ) -> Result<Self, SetupError> {
        config.validate().map_err(ConfigError::from)?;

        let pool = build_pool(&config.database)?;
        if config.database.run_migrations {
            run_migrations(&pool).await?;
        }

        let services = AppServices {
            uow_factory: Arc::new(PostgresUnitOfWorkFactory::new(pool.clone())),
            user_reader: Arc::new(PostgresUserReader::new(pool.clone())),
            password_hasher: Arc::new(Argon2PasswordHasher::from_config(&config.security)?),
        };
        let mediator = build_mediator(services, publisher)?;

        info!(environment = ?config.server.environment, "Application assembled");
        Ok(Self {
            config,
            pool,
            mediator,
        })
    }
}

//! ChangePasswordHandler - Command handler for replacing a password.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use super::load_target;
use crate::application::authorization::{
    authorize, AnyOf, CanManageSelf, CanManageSubordinate, UserManagementContext,
};
use crate::application::current_user::CurrentUserService;
use crate::application::errors::AppError;
use crate::application::handlers::factory::{record, HandlerScope, ScopedHandler};
use crate::application::mediator::EventRecorder;
use crate::domain::foundation::SerializableDomainEvent;
use crate::domain::user::{RawPassword, UserPasswordChanged, UserService};
use crate::ports::{AppUnitOfWork, UserCommandGateway};

/// Command to change a user's password.
///
/// Users may change their own password; admins may change the password of
/// anyone below them.
#[derive(Clone)]
pub struct ChangePasswordCommand {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ChangePasswordCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordCommand")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub struct ChangePasswordHandler {
    current_user: CurrentUserService,
    user_service: Arc<UserService>,
    users: Arc<dyn UserCommandGateway>,
    uow: Arc<dyn AppUnitOfWork>,
    events: Arc<EventRecorder>,
}

impl ChangePasswordHandler {
    pub fn new(
        current_user: CurrentUserService,
        user_service: Arc<UserService>,
        users: Arc<dyn UserCommandGateway>,
        uow: Arc<dyn AppUnitOfWork>,
        events: Arc<EventRecorder>,
    ) -> Self {
        Self {
            current_user,
            user_service,
            users,
            uow,
            events,
        }
    }

    pub async fn handle(&self, cmd: ChangePasswordCommand) -> Result<(), AppError> {
        info!(username = %cmd.username, "Change password: started");

        // 1. Resolve the acting user and the target
        let current_user = self.current_user.current_user().await?;
        let mut target = load_target(self.users.as_ref(), &cmd.username).await?;

        // 2. Authorize - self or subordinate
        authorize(
            &AnyOf(CanManageSelf, CanManageSubordinate),
            &UserManagementContext {
                subject: &current_user,
                target: &target,
            },
        )?;

        // 3. Hash and stage
        let password = RawPassword::new(cmd.password)?;
        let changes = self.user_service.change_password(&target, &password)?;
        self.users.update(&mut target, changes).await?;

        // 4. Persist
        self.uow.flush().await?;
        self.uow.commit().await?;

        record(
            &self.events,
            UserPasswordChanged::new(target.id(), current_user.id()).to_envelope(),
            &current_user.id().to_string(),
        );

        info!(user_id = %target.id(), "Change password: done");
        Ok(())
    }
}

#[async_trait]
impl ScopedHandler for ChangePasswordHandler {
    type Request = ChangePasswordCommand;

    fn build(scope: &HandlerScope) -> Self {
        Self::new(
            scope.current_user.clone(),
            scope.user_service.clone(),
            scope.users.clone(),
            scope.uow.clone(),
            scope.events.clone(),
        )
    }

    async fn run(&self, request: ChangePasswordCommand) -> Result<(), AppError> {
        self.handle(request).await
    }
}

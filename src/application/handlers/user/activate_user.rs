//! ActivateUserHandler - Command handler for reactivating a user.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::load_target;
use crate::application::authorization::{
    authorize, CanManageRole, CanManageSubordinate, RoleManagementContext,
    UserManagementContext,
};
use crate::application::current_user::CurrentUserService;
use crate::application::errors::AppError;
use crate::application::handlers::factory::{record, HandlerScope, ScopedHandler};
use crate::application::mediator::EventRecorder;
use crate::domain::foundation::SerializableDomainEvent;
use crate::domain::user::{UserActivated, UserRole, UserService};
use crate::ports::{AppUnitOfWork, UserCommandGateway};

/// Command to reactivate an inactive user. Open to admins.
#[derive(Debug, Clone)]
pub struct ActivateUserCommand {
    pub username: String,
}

pub struct ActivateUserHandler {
    current_user: CurrentUserService,
    user_service: Arc<UserService>,
    users: Arc<dyn UserCommandGateway>,
    uow: Arc<dyn AppUnitOfWork>,
    events: Arc<EventRecorder>,
}

impl ActivateUserHandler {
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

    pub async fn handle(&self, cmd: ActivateUserCommand) -> Result<(), AppError> {
        info!(username = %cmd.username, "Activate user: started");

        // 1. Resolve the acting user, authorize for the user role
        let current_user = self.current_user.current_user().await?;
        authorize(
            &CanManageRole,
            &RoleManagementContext {
                subject: &current_user,
                target_role: UserRole::User,
            },
        )?;

        // 2. Load target, authorize against its actual role
        let mut target = load_target(self.users.as_ref(), &cmd.username).await?;
        authorize(
            &CanManageSubordinate,
            &UserManagementContext {
                subject: &current_user,
                target: &target,
            },
        )?;

        // 3. Apply transition
        let changes = self.user_service.toggle_activation(&target, true)?;
        self.users.update(&mut target, changes).await?;

        // 4. Persist
        self.uow.flush().await?;
        self.uow.commit().await?;

        record(
            &self.events,
            UserActivated::new(target.id(), current_user.id()).to_envelope(),
            &current_user.id().to_string(),
        );

        info!(user_id = %target.id(), "Activate user: done");
        Ok(())
    }
}

#[async_trait]
impl ScopedHandler for ActivateUserHandler {
    type Request = ActivateUserCommand;

    fn build(scope: &HandlerScope) -> Self {
        Self::new(
            scope.current_user.clone(),
            scope.user_service.clone(),
            scope.users.clone(),
            scope.uow.clone(),
            scope.events.clone(),
        )
    }

    async fn run(&self, request: ActivateUserCommand) -> Result<(), AppError> {
        self.handle(request).await
    }
}

//! DeactivateUserHandler - Command handler for deactivating a user.

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
use crate::domain::user::{UserDeactivated, UserRole, UserService};
use crate::ports::{AccessRevoker, AppUnitOfWork, UserCommandGateway};

/// Command to deactivate a user and end all of their sessions.
/// Open to admins.
#[derive(Debug, Clone)]
pub struct DeactivateUserCommand {
    pub username: String,
}

pub struct DeactivateUserHandler {
    current_user: CurrentUserService,
    user_service: Arc<UserService>,
    users: Arc<dyn UserCommandGateway>,
    access_revoker: Arc<dyn AccessRevoker>,
    uow: Arc<dyn AppUnitOfWork>,
    events: Arc<EventRecorder>,
}

impl DeactivateUserHandler {
    pub fn new(
        current_user: CurrentUserService,
        user_service: Arc<UserService>,
        users: Arc<dyn UserCommandGateway>,
        access_revoker: Arc<dyn AccessRevoker>,
        uow: Arc<dyn AppUnitOfWork>,
        events: Arc<EventRecorder>,
    ) -> Self {
        Self {
            current_user,
            user_service,
            users,
            access_revoker,
            uow,
            events,
        }
    }

    pub async fn handle(&self, cmd: DeactivateUserCommand) -> Result<(), AppError> {
        info!(username = %cmd.username, "Deactivate user: started");

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
        let changes = self.user_service.toggle_activation(&target, false)?;
        self.users.update(&mut target, changes).await?;

        // 4. Persist, revoking access before the commit so a failed
        //    revocation leaves the user active
        self.uow.flush().await?;
        self.access_revoker
            .remove_all_user_access(target.id())
            .await?;
        self.uow.commit().await?;

        record(
            &self.events,
            UserDeactivated::new(target.id(), current_user.id()).to_envelope(),
            &current_user.id().to_string(),
        );

        info!(user_id = %target.id(), "Deactivate user: done");
        Ok(())
    }
}

#[async_trait]
impl ScopedHandler for DeactivateUserHandler {
    type Request = DeactivateUserCommand;

    fn build(scope: &HandlerScope) -> Self {
        Self::new(
            scope.current_user.clone(),
            scope.user_service.clone(),
            scope.users.clone(),
            scope.access_revoker.clone(),
            scope.uow.clone(),
            scope.events.clone(),
        )
    }

    async fn run(&self, request: DeactivateUserCommand) -> Result<(), AppError> {
        self.handle(request).await
    }
}

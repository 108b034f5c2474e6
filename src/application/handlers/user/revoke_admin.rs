//! RevokeAdminHandler - Command handler for demoting an admin.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::load_target;
use crate::application::authorization::{authorize, CanManageRole, RoleManagementContext};
use crate::application::current_user::CurrentUserService;
use crate::application::errors::AppError;
use crate::application::handlers::factory::{record, HandlerScope, ScopedHandler};
use crate::application::mediator::EventRecorder;
use crate::domain::foundation::SerializableDomainEvent;
use crate::domain::user::{AdminRevoked, UserRole, UserService};
use crate::ports::{AccessRevoker, AppUnitOfWork, UserCommandGateway};

/// Command to demote an admin to a regular user. Open to super admins.
///
/// The demoted user's sessions are terminated so that admin rights held
/// by live sessions end immediately.
#[derive(Debug, Clone)]
pub struct RevokeAdminCommand {
    pub username: String,
}

pub struct RevokeAdminHandler {
    current_user: CurrentUserService,
    user_service: Arc<UserService>,
    users: Arc<dyn UserCommandGateway>,
    access_revoker: Arc<dyn AccessRevoker>,
    uow: Arc<dyn AppUnitOfWork>,
    events: Arc<EventRecorder>,
}

impl RevokeAdminHandler {
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

    pub async fn handle(&self, cmd: RevokeAdminCommand) -> Result<(), AppError> {
        info!(username = %cmd.username, "Revoke admin: started");

        // 1. Resolve the acting user, authorize for the admin role
        let current_user = self.current_user.current_user().await?;
        authorize(
            &CanManageRole,
            &RoleManagementContext {
                subject: &current_user,
                target_role: UserRole::Admin,
            },
        )?;

        // 2. Load target and apply transition
        let mut target = load_target(self.users.as_ref(), &cmd.username).await?;
        let changes = self.user_service.toggle_admin_role(&target, false)?;
        self.users.update(&mut target, changes).await?;

        // 3. Persist
        self.uow.flush().await?;
        self.access_revoker
            .remove_all_user_access(target.id())
            .await?;
        self.uow.commit().await?;

        record(
            &self.events,
            AdminRevoked::new(target.id(), current_user.id()).to_envelope(),
            &current_user.id().to_string(),
        );

        info!(user_id = %target.id(), "Revoke admin: done");
        Ok(())
    }
}

#[async_trait]
impl ScopedHandler for RevokeAdminHandler {
    type Request = RevokeAdminCommand;

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

    async fn run(&self, request: RevokeAdminCommand) -> Result<(), AppError> {
        self.handle(request).await
    }
}

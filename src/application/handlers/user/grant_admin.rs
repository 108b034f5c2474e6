//! GrantAdminHandler - Command handler for promoting a user to admin.

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
use crate::domain::user::{AdminGranted, UserRole, UserService};
use crate::ports::{AppUnitOfWork, UserCommandGateway};

/// Command to promote a user to admin. Open to super admins.
#[derive(Debug, Clone)]
pub struct GrantAdminCommand {
    pub username: String,
}

pub struct GrantAdminHandler {
    current_user: CurrentUserService,
    user_service: Arc<UserService>,
    users: Arc<dyn UserCommandGateway>,
    uow: Arc<dyn AppUnitOfWork>,
    events: Arc<EventRecorder>,
}

impl GrantAdminHandler {
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

    pub async fn handle(&self, cmd: GrantAdminCommand) -> Result<(), AppError> {
        info!(username = %cmd.username, "Grant admin: started");

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
        let changes = self.user_service.toggle_admin_role(&target, true)?;
        self.users.update(&mut target, changes).await?;

        // 3. Persist
        self.uow.flush().await?;
        self.uow.commit().await?;

        record(
            &self.events,
            AdminGranted::new(target.id(), current_user.id()).to_envelope(),
            &current_user.id().to_string(),
        );

        info!(user_id = %target.id(), "Grant admin: done");
        Ok(())
    }
}

#[async_trait]
impl ScopedHandler for GrantAdminHandler {
    type Request = GrantAdminCommand;

    fn build(scope: &HandlerScope) -> Self {
        Self::new(
            scope.current_user.clone(),
            scope.user_service.clone(),
            scope.users.clone(),
            scope.uow.clone(),
            scope.events.clone(),
        )
    }

    async fn run(&self, request: GrantAdminCommand) -> Result<(), AppError> {
        self.handle(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::user::{TransitionRejection, UserError};

    fn command(username: &str) -> GrantAdminCommand {
        GrantAdminCommand {
            username: username.to_string(),
        }
    }

    #[tokio::test]
    async fn super_admin_promotes_user() {
        let fx = Fixture::acting_as(UserRole::SuperAdmin).await;
        fx.seed("member", UserRole::User, true).await;

        fx.handler::<GrantAdminHandler>()
            .handle(command("member"))
            .await
            .unwrap();

        assert_eq!(
            fx.stored_user("member").await.unwrap().role(),
            UserRole::Admin
        );
        assert_eq!(fx.event_types(), vec!["user.admin_granted.v1"]);
    }

    #[tokio::test]
    async fn fails_when_caller_is_admin() {
        let fx = Fixture::acting_as(UserRole::Admin).await;
        fx.seed("member", UserRole::User, true).await;

        let err = fx
            .handler::<GrantAdminHandler>()
            .handle(command("member"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Authorization(_)));
        assert_eq!(
            fx.stored_user("member").await.unwrap().role(),
            UserRole::User
        );
    }

    #[tokio::test]
    async fn fails_when_target_already_admin() {
        let fx = Fixture::acting_as(UserRole::SuperAdmin).await;
        fx.seed("helper", UserRole::Admin, true).await;

        let err = fx
            .handler::<GrantAdminHandler>()
            .handle(command("helper"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::User(UserError::RoleChangeNotPermitted {
                reason: TransitionRejection::Unchanged,
                ..
            })
        ));
    }
}

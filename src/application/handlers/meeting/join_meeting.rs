//! JoinMeetingHandler - Records that the caller joined a meeting.
//!
//! Meetings are not persisted yet; the handler authenticates the caller
//! and logs the join.

use async_trait::async_trait;
use tracing::info;

use crate::application::current_user::CurrentUserService;
use crate::application::errors::AppError;
use crate::application::handlers::factory::{HandlerScope, ScopedHandler};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinMeetingCommand {
    pub meeting_id: i64,
    pub user_id: i64,
    pub is_late: bool,
}

pub struct JoinMeetingHandler {
    current_user: CurrentUserService,
}

impl JoinMeetingHandler {
    pub fn new(current_user: CurrentUserService) -> Self {
        Self { current_user }
    }

    pub async fn handle(&self, cmd: JoinMeetingCommand) -> Result<(), AppError> {
        let current_user = self.current_user.current_user().await?;

        info!(
            meeting_id = cmd.meeting_id,
            participant = cmd.user_id,
            is_late = cmd.is_late,
            caller = %current_user.id(),
            "Join meeting"
        );
        Ok(())
    }
}

#[async_trait]
impl ScopedHandler for JoinMeetingHandler {
    type Request = JoinMeetingCommand;

    fn build(scope: &HandlerScope) -> Self {
        Self::new(scope.current_user.clone())
    }

    async fn run(&self, request: JoinMeetingCommand) -> Result<(), AppError> {
        self.handle(request).await
    }
}

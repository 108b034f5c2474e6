//! ListUsersHandler - Query handler for the admin user listing.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::authorization::{authorize, CanManageRole, RoleManagementContext};
use crate::application::current_user::CurrentUserService;
use crate::application::errors::AppError;
use crate::application::handlers::factory::{HandlerScope, ScopedHandler};
use crate::domain::user::{UserRole, UserSortField};
use crate::ports::{
    Pagination, Sorting, SortingOrder, UserListParams, UserQueryGateway, UserQueryModel,
};

/// Query for a page of users. Open to admins.
#[derive(Debug, Clone)]
pub struct ListUsersQuery {
    pub limit: i64,
    pub offset: i64,
    pub sorting_field: String,
    pub sorting_order: SortingOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListUsersResult {
    pub users: Vec<UserQueryModel>,
}

pub struct ListUsersHandler {
    current_user: CurrentUserService,
    reader: Arc<dyn UserQueryGateway>,
}

impl ListUsersHandler {
    pub fn new(current_user: CurrentUserService, reader: Arc<dyn UserQueryGateway>) -> Self {
        Self {
            current_user,
            reader,
        }
    }

    pub async fn handle(&self, query: ListUsersQuery) -> Result<ListUsersResult, AppError> {
        info!("List users: started");

        // 1. Resolve the acting user and authorize
        let current_user = self.current_user.current_user().await?;
        authorize(
            &CanManageRole,
            &RoleManagementContext {
                subject: &current_user,
                target_role: UserRole::User,
            },
        )?;

        // 2. Validate paging and sorting
        let params = UserListParams {
            pagination: Pagination::new(query.limit, query.offset)?,
            sorting: Sorting::new(
                query.sorting_field.parse::<UserSortField>()?,
                query.sorting_order,
            ),
        };

        // 3. Read
        debug!(?params, "Retrieving list of users");
        let users = self.reader.read_all(&params).await?;

        info!(count = users.len(), "List users: done");
        Ok(ListUsersResult { users })
    }
}

#[async_trait]
impl ScopedHandler for ListUsersHandler {
    type Request = ListUsersQuery;

    fn build(scope: &HandlerScope) -> Self {
        Self::new(scope.current_user.clone(), scope.user_reader.clone())
    }

    async fn run(&self, request: ListUsersQuery) -> Result<ListUsersResult, AppError> {
        self.handle(request).await
    }
}

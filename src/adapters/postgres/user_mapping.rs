//! `users` table mapping.

use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::entity::{PgEntity, PgValue};
use crate::domain::foundation::UserId;
use crate::domain::user::{User, UserCriteria, UserPasswordHash, UserRole, UserSortField, Username};
use crate::ports::DataMapperError;

impl PgEntity for User {
    const TABLE: &'static str = "users";

    const COLUMNS: &'static [&'static str] = &["id", "username", "password_hash", "role", "is_active"];

    fn id_value(id: &UserId) -> PgValue {
        PgValue::Uuid(*id.as_uuid())
    }

    fn values(&self) -> Vec<PgValue> {
        vec![
            PgValue::Uuid(*self.id().as_uuid()),
            PgValue::Text(self.username().to_string()),
            PgValue::Text(self.password_hash().as_str().to_string()),
            PgValue::Text(self.role().as_str().to_string()),
            PgValue::Bool(self.is_active()),
        ]
    }

    fn filters(criteria: &UserCriteria) -> Vec<(&'static str, PgValue)> {
        let mut filters = Vec::new();
        if let Some(id) = criteria.id {
            filters.push(("id", PgValue::Uuid(*id.as_uuid())));
        }
        if let Some(username) = &criteria.username {
            filters.push(("username", PgValue::Text(username.to_string())));
        }
        if let Some(role) = criteria.role {
            filters.push(("role", PgValue::Text(role.as_str().to_string())));
        }
        if let Some(is_active) = criteria.is_active {
            filters.push(("is_active", PgValue::Bool(is_active)));
        }
        filters
    }

    fn sort_column(field: UserSortField) -> &'static str {
        field.as_str()
    }

    fn from_row(row: &PgRow) -> Result<Self, DataMapperError> {
        let id: Uuid = row.try_get("id").map_err(column_error)?;
        let username: String = row.try_get("username").map_err(column_error)?;
        let password_hash: String = row.try_get("password_hash").map_err(column_error)?;
        let role: String = row.try_get("role").map_err(column_error)?;
        let is_active: bool = row.try_get("is_active").map_err(column_error)?;

        Ok(User::new(
            UserId::from_uuid(id),
            Username::new(username).map_err(corrupt_row)?,
            UserPasswordHash::new(password_hash),
            role.parse::<UserRole>().map_err(corrupt_row)?,
            is_active,
        ))
    }
}

pub(super) fn column_error(e: sqlx::Error) -> DataMapperError {
    DataMapperError::QueryFailed(format!("Failed to read column: {}", e))
}

pub(super) fn corrupt_row(e: impl std::fmt::Display) -> DataMapperError {
    DataMapperError::QueryFailed(format!("Stored user row is invalid: {}", e))
}

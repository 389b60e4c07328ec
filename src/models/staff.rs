//! Staff account models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::StaffRole;

/// Staff account as exposed to admin endpoints (never carries the hash)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffAccount {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: StaffRole,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Row with the role still as text
#[derive(Debug, Clone, FromRow)]
pub struct StaffAccountRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<StaffAccountRow> for StaffAccount {
    type Error = String;

    fn try_from(row: StaffAccountRow) -> Result<Self, Self::Error> {
        Ok(StaffAccount {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row.role.parse()?,
            enabled: row.enabled,
            created_at: row.created_at,
        })
    }
}

/// Moderator creation request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateModerator {
    #[validate(length(min = 1, max = 128))]
    pub first_name: String,
    #[validate(length(min = 1, max = 128))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, max = 255, message = "Password must be 6-255 characters"))]
    pub password: String,
}

/// Enable/disable a moderator
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStaffStatus {
    pub enabled: bool,
}

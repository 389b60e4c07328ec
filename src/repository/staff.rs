//! Staff accounts repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::staff::{StaffAccount, StaffAccountRow},
};

#[derive(Clone)]
pub struct StaffRepository {
    pool: Pool<Postgres>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM staff_accounts WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn create_moderator(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<StaffAccount> {
        let row = sqlx::query_as::<_, StaffAccountRow>(
            r#"
            INSERT INTO staff_accounts (first_name, last_name, email, password_hash, role, enabled)
            VALUES ($1, $2, $3, $4, 'MODERATOR', TRUE)
            RETURNING id, first_name, last_name, email, role, enabled, created_at
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        row.try_into().map_err(AppError::Internal)
    }

    pub async fn list_moderators(&self) -> AppResult<Vec<StaffAccount>> {
        let rows = sqlx::query_as::<_, StaffAccountRow>(
            r#"
            SELECT id, first_name, last_name, email, role, enabled, created_at
            FROM staff_accounts
            WHERE role = 'MODERATOR'
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.try_into().map_err(AppError::Internal))
            .collect()
    }

    /// Fetch a moderator by ID; admins are invisible to this lookup.
    pub async fn get_moderator(&self, id: i64) -> AppResult<StaffAccount> {
        let row = sqlx::query_as::<_, StaffAccountRow>(
            r#"
            SELECT id, first_name, last_name, email, role, enabled, created_at
            FROM staff_accounts
            WHERE id = $1 AND role = 'MODERATOR'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Moderator with id {} not found", id)))?;

        row.try_into().map_err(AppError::Internal)
    }

    pub async fn set_enabled(&self, id: i64, enabled: bool) -> AppResult<StaffAccount> {
        let updated =
            sqlx::query("UPDATE staff_accounts SET enabled = $1 WHERE id = $2 AND role = 'MODERATOR'")
                .bind(enabled)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Moderator with id {} not found",
                id
            )));
        }

        self.get_moderator(id).await
    }

    pub async fn delete_moderator(&self, id: i64) -> AppResult<()> {
        let deleted =
            sqlx::query("DELETE FROM staff_accounts WHERE id = $1 AND role = 'MODERATOR'")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Moderator with id {} not found",
                id
            )));
        }

        Ok(())
    }
}

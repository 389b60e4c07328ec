//! Credential lookup across the two identity tables

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres};

use crate::{
    auth::Principal,
    error::{AppError, AppResult},
    models::library::LibraryStatus,
};

/// Read-only credential lookup used by the authenticator.
///
/// The two tables are not mutually exclusive at the schema level; the union
/// is resolved by `find_principal_by_email` with a fixed probe order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_library_credential_by_email(&self, email: &str)
        -> AppResult<Option<Principal>>;

    async fn find_staff_by_email(&self, email: &str) -> AppResult<Option<Principal>>;

    /// Ordered union lookup: library credentials first, staff second, first
    /// match wins. A library email therefore shadows a staff account with
    /// the same address. The precedence is an intentional, observable
    /// contract; do not reorder.
    async fn find_principal_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        if let Some(principal) = self.find_library_credential_by_email(email).await? {
            return Ok(Some(principal));
        }
        self.find_staff_by_email(email).await
    }
}

#[derive(Debug, FromRow)]
struct LibraryCredentialRow {
    library_id: i64,
    email: String,
    password_hash: String,
    status: LibraryStatus,
}

#[derive(Debug, FromRow)]
struct StaffCredentialRow {
    id: i64,
    email: String,
    password_hash: String,
    role: String,
    enabled: bool,
}

/// Postgres-backed credential store
#[derive(Clone)]
pub struct CredentialsRepository {
    pool: Pool<Postgres>,
}

impl CredentialsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for CredentialsRepository {
    async fn find_library_credential_by_email(
        &self,
        email: &str,
    ) -> AppResult<Option<Principal>> {
        let row = sqlx::query_as::<_, LibraryCredentialRow>(
            r#"
            SELECT c.library_id, c.email, c.password_hash, l.status
            FROM library_credentials c
            JOIN libraries l ON l.id = c.library_id
            WHERE LOWER(c.email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Principal::Library {
            id: r.library_id,
            email: r.email,
            password_hash: r.password_hash,
            active: r.status == LibraryStatus::Active,
        }))
    }

    async fn find_staff_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        let row = sqlx::query_as::<_, StaffCredentialRow>(
            r#"
            SELECT id, email, password_hash, role, enabled
            FROM staff_accounts
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(Principal::Staff {
                id: r.id,
                email: r.email,
                password_hash: r.password_hash,
                role: r
                    .role
                    .parse()
                    .map_err(|e: String| AppError::Internal(e))?,
                enabled: r.enabled,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaffRole;

    /// In-memory store exercising the provided ordered lookup.
    struct InMemoryStore {
        library: Option<Principal>,
        staff: Option<Principal>,
    }

    #[async_trait]
    impl CredentialStore for InMemoryStore {
        async fn find_library_credential_by_email(
            &self,
            _email: &str,
        ) -> AppResult<Option<Principal>> {
            Ok(self.library.clone())
        }

        async fn find_staff_by_email(&self, _email: &str) -> AppResult<Option<Principal>> {
            Ok(self.staff.clone())
        }
    }

    fn library_principal() -> Principal {
        Principal::Library {
            id: 1,
            email: "shared@x.com".to_string(),
            password_hash: "$argon2id$lib".to_string(),
            active: true,
        }
    }

    fn staff_principal() -> Principal {
        Principal::Staff {
            id: 9,
            email: "shared@x.com".to_string(),
            password_hash: "$argon2id$staff".to_string(),
            role: StaffRole::Admin,
            enabled: true,
        }
    }

    #[tokio::test]
    async fn library_credential_shadows_staff_with_same_email() {
        let store = InMemoryStore {
            library: Some(library_principal()),
            staff: Some(staff_principal()),
        };
        let found = store.find_principal_by_email("shared@x.com").await.unwrap();
        assert_eq!(found, Some(library_principal()));
    }

    #[tokio::test]
    async fn falls_through_to_staff_when_no_library_matches() {
        let store = InMemoryStore {
            library: None,
            staff: Some(staff_principal()),
        };
        let found = store.find_principal_by_email("shared@x.com").await.unwrap();
        assert_eq!(found, Some(staff_principal()));
    }

    #[tokio::test]
    async fn no_match_in_either_table_is_none() {
        let store = InMemoryStore {
            library: None,
            staff: None,
        };
        let found = store.find_principal_by_email("nobody@x.com").await.unwrap();
        assert_eq!(found, None);
    }
}

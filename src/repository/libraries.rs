//! Libraries repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::library::{
        Library, LibraryRow, LibraryStatus, LibrarySummary, RegisterLibrary, UpdateLibrary,
    },
};

const LIBRARY_SELECT: &str = r#"
    SELECT l.id, l.trade_name, l.legal_name, l.registration_number, l.phone,
           l.category, l.website, l.photo_url, l.status, l.created_at,
           a.id AS address_id, a.zip_code, a.street, a.number, a.complement,
           a.district, a.city, a.state, a.latitude, a.longitude
    FROM libraries l
    JOIN addresses a ON a.id = l.address_id
"#;

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Postgres>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a library with its address by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Library> {
        let row = sqlx::query_as::<_, LibraryRow>(&format!("{} WHERE l.id = $1", LIBRARY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Map-view projection of every active library
    pub async fn list_active(&self) -> AppResult<Vec<LibrarySummary>> {
        let summaries = sqlx::query_as::<_, LibrarySummary>(
            r#"
            SELECT l.id, l.trade_name, l.category, a.city, a.latitude, a.longitude
            FROM libraries l
            JOIN addresses a ON a.id = l.address_id
            WHERE l.status = 'active'
            ORDER BY l.trade_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    /// Paginated admin listing, optionally filtered by status
    pub async fn list_admin(
        &self,
        status: Option<LibraryStatus>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<Library>, i64)> {
        let offset = (page - 1) * per_page;

        let (rows, total) = if let Some(status) = status {
            let rows = sqlx::query_as::<_, LibraryRow>(&format!(
                "{} WHERE l.status = $1 ORDER BY l.created_at DESC LIMIT $2 OFFSET $3",
                LIBRARY_SELECT
            ))
            .bind(status)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM libraries WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
            (rows, total)
        } else {
            let rows = sqlx::query_as::<_, LibraryRow>(&format!(
                "{} ORDER BY l.created_at DESC LIMIT $1 OFFSET $2",
                LIBRARY_SELECT
            ))
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM libraries")
                .fetch_one(&self.pool)
                .await?;
            (rows, total)
        };

        Ok((rows.into_iter().map(Library::from).collect(), total))
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM libraries")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn count_by_status(&self, status: LibraryStatus) -> AppResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM libraries WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// Check if a credential email is already taken
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM library_credentials WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Check if a registration number is already taken
    pub async fn registration_number_exists(&self, registration_number: &str) -> AppResult<bool> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM libraries WHERE registration_number = $1)",
        )
        .bind(registration_number)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Create address, library (pending) and credential in one transaction
    pub async fn create(
        &self,
        registration: &RegisterLibrary,
        password_hash: &str,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Library> {
        let mut tx = self.pool.begin().await?;

        let address_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO addresses (zip_code, street, number, complement, district, city, state, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&registration.address.zip_code)
        .bind(&registration.address.street)
        .bind(&registration.address.number)
        .bind(&registration.address.complement)
        .bind(&registration.address.district)
        .bind(&registration.address.city)
        .bind(&registration.address.state)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(&mut *tx)
        .await?;

        let library_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO libraries (trade_name, legal_name, registration_number, phone, category, website, status, address_id)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)
            RETURNING id
            "#,
        )
        .bind(&registration.trade_name)
        .bind(&registration.legal_name)
        .bind(&registration.registration_number)
        .bind(&registration.phone)
        .bind(&registration.category)
        .bind(&registration.website)
        .bind(address_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO library_credentials (library_id, email, password_hash) VALUES ($1, $2, $3)",
        )
        .bind(library_id)
        .bind(&registration.email)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(library_id).await
    }

    /// Update profile and address (coordinates already re-geocoded)
    pub async fn update_profile(
        &self,
        id: i64,
        update: &UpdateLibrary,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Library> {
        let mut tx = self.pool.begin().await?;

        let address_id: Option<i64> =
            sqlx::query_scalar("SELECT address_id FROM libraries WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let address_id = address_id
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))?;

        sqlx::query(
            r#"
            UPDATE libraries
            SET trade_name = $1, legal_name = $2, phone = $3, category = $4,
                website = $5, photo_url = $6
            WHERE id = $7
            "#,
        )
        .bind(&update.trade_name)
        .bind(&update.legal_name)
        .bind(&update.phone)
        .bind(&update.category)
        .bind(&update.website)
        .bind(&update.photo_url)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE addresses
            SET zip_code = $1, street = $2, number = $3, complement = $4,
                district = $5, city = $6, state = $7, latitude = $8, longitude = $9
            WHERE id = $10
            "#,
        )
        .bind(&update.address.zip_code)
        .bind(&update.address.street)
        .bind(&update.address.number)
        .bind(&update.address.complement)
        .bind(&update.address.district)
        .bind(&update.address.city)
        .bind(&update.address.state)
        .bind(latitude)
        .bind(longitude)
        .bind(address_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Change lifecycle status (staff operation)
    pub async fn update_status(&self, id: i64, status: LibraryStatus) -> AppResult<Library> {
        let updated = sqlx::query("UPDATE libraries SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Library with id {} not found",
                id
            )));
        }

        self.get_by_id(id).await
    }

    /// Delete a library together with its address; credentials and holdings
    /// go away via ON DELETE CASCADE.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let address_id: Option<i64> =
            sqlx::query_scalar("SELECT address_id FROM libraries WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let address_id = address_id
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))?;

        sqlx::query("DELETE FROM libraries WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(address_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

//! Staff operations: dashboard, library lifecycle, moderator management

use crate::{
    api::admin::DashboardResponse,
    auth::password,
    error::{AppError, AppResult},
    models::{
        library::{Library, LibraryQuery, LibraryStatus},
        staff::{CreateModerator, StaffAccount},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AdminService {
    repository: Repository,
}

impl AdminService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Aggregate counters plus the map points for the admin dashboard
    pub async fn dashboard(&self) -> AppResult<DashboardResponse> {
        let total_libraries = self.repository.libraries.count_all().await?;
        let active_libraries = self
            .repository
            .libraries
            .count_by_status(LibraryStatus::Active)
            .await?;
        let pending_libraries = self
            .repository
            .libraries
            .count_by_status(LibraryStatus::Pending)
            .await?;
        let total_books = self.repository.books.count_books().await?;
        let total_copies = self.repository.books.total_copies().await?;
        let map = self.repository.libraries.list_active().await?;

        Ok(DashboardResponse {
            total_libraries,
            active_libraries,
            pending_libraries,
            total_books,
            total_copies,
            map,
        })
    }

    pub async fn list_libraries(&self, query: &LibraryQuery) -> AppResult<(Vec<Library>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        self.repository
            .libraries
            .list_admin(query.status, page, per_page)
            .await
    }

    /// Approve or deactivate a library
    pub async fn update_library_status(
        &self,
        id: i64,
        status: LibraryStatus,
    ) -> AppResult<Library> {
        let library = self.repository.libraries.update_status(id, status).await?;
        tracing::info!(library_id = id, status = %status, "library status changed");
        Ok(library)
    }

    pub async fn delete_library(&self, id: i64) -> AppResult<()> {
        self.repository.libraries.delete(id).await?;
        tracing::info!(library_id = id, "library deleted");
        Ok(())
    }

    /// Create a moderator account (admin only, enforced at the handler)
    pub async fn create_moderator(&self, request: CreateModerator) -> AppResult<StaffAccount> {
        if self.repository.staff.email_exists(&request.email).await? {
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }

        let password_hash = password::hash_password_blocking(request.password.clone()).await?;

        let moderator = self
            .repository
            .staff
            .create_moderator(
                &request.first_name,
                &request.last_name,
                &request.email,
                &password_hash,
            )
            .await?;

        tracing::info!(staff_id = moderator.id, "moderator created");
        Ok(moderator)
    }

    pub async fn list_moderators(&self) -> AppResult<Vec<StaffAccount>> {
        self.repository.staff.list_moderators().await
    }

    pub async fn update_moderator_status(
        &self,
        id: i64,
        enabled: bool,
    ) -> AppResult<StaffAccount> {
        let moderator = self.repository.staff.set_enabled(id, enabled).await?;
        tracing::info!(staff_id = id, enabled, "moderator status changed");
        Ok(moderator)
    }

    pub async fn delete_moderator(&self, id: i64) -> AppResult<()> {
        self.repository.staff.delete_moderator(id).await?;
        tracing::info!(staff_id = id, "moderator deleted");
        Ok(())
    }
}

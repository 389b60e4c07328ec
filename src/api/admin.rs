//! Staff endpoints: dashboard, library lifecycle, moderator management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        library::{Library, LibraryQuery, LibrarySummary, UpdateLibraryStatus},
        staff::{CreateModerator, StaffAccount, UpdateStaffStatus},
    },
};

use super::{AuthenticatedPrincipal, PaginatedResponse};

/// Dashboard aggregates with map points
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub total_libraries: i64,
    pub active_libraries: i64,
    pub pending_libraries: i64,
    pub total_books: i64,
    pub total_copies: i64,
    pub map: Vec<LibrarySummary>,
}

/// Dashboard counters and map (admin or moderator)
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not a staff account")
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
) -> AppResult<Json<DashboardResponse>> {
    ctx.require_staff()?;

    let dashboard = state.services.admin.dashboard().await?;
    Ok(Json(dashboard))
}

/// List libraries with status filter (admin or moderator)
#[utoipa::path(
    get,
    path = "/admin/libraries",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(LibraryQuery),
    responses(
        (status = 200, description = "Libraries", body = PaginatedResponse<Library>),
        (status = 403, description = "Not a staff account")
    )
)]
pub async fn list_libraries(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Query(query): Query<LibraryQuery>,
) -> AppResult<Json<PaginatedResponse<Library>>> {
    ctx.require_staff()?;

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(20);
    let (libraries, total) = state.services.admin.list_libraries(&query).await?;

    Ok(Json(PaginatedResponse {
        items: libraries,
        total,
        page,
        per_page,
    }))
}

/// Approve or deactivate a library (admin or moderator)
#[utoipa::path(
    put,
    path = "/admin/libraries/{id}/status",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    request_body = UpdateLibraryStatus,
    responses(
        (status = 200, description = "Status updated", body = Library),
        (status = 403, description = "Not a staff account"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn update_library_status(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path(id): Path<i64>,
    Json(request): Json<UpdateLibraryStatus>,
) -> AppResult<Json<Library>> {
    ctx.require_staff()?;

    let library = state
        .services
        .admin
        .update_library_status(id, request.status)
        .await?;
    Ok(Json(library))
}

/// Delete a library (admin or moderator)
#[utoipa::path(
    delete,
    path = "/admin/libraries/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    responses(
        (status = 204, description = "Library deleted"),
        (status = 403, description = "Not a staff account"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn delete_library(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    ctx.require_staff()?;

    state.services.admin.delete_library(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a moderator (admin only)
#[utoipa::path(
    post,
    path = "/admin/moderators",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateModerator,
    responses(
        (status = 201, description = "Moderator created", body = StaffAccount),
        (status = 403, description = "Administrator privileges required"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_moderator(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Json(request): Json<CreateModerator>,
) -> AppResult<(StatusCode, Json<StaffAccount>)> {
    ctx.require_admin()?;
    request.validate()?;

    let moderator = state.services.admin.create_moderator(request).await?;
    Ok((StatusCode::CREATED, Json(moderator)))
}

/// List moderators (admin only)
#[utoipa::path(
    get,
    path = "/admin/moderators",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Moderators", body = [StaffAccount]),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_moderators(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
) -> AppResult<Json<Vec<StaffAccount>>> {
    ctx.require_admin()?;

    let moderators = state.services.admin.list_moderators().await?;
    Ok(Json(moderators))
}

/// Enable or disable a moderator (admin only)
#[utoipa::path(
    patch,
    path = "/admin/moderators/{id}/status",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Staff ID")),
    request_body = UpdateStaffStatus,
    responses(
        (status = 200, description = "Moderator updated", body = StaffAccount),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Moderator not found")
    )
)]
pub async fn update_moderator_status(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStaffStatus>,
) -> AppResult<Json<StaffAccount>> {
    ctx.require_admin()?;

    let moderator = state
        .services
        .admin
        .update_moderator_status(id, request.enabled)
        .await?;
    Ok(Json(moderator))
}

/// Delete a moderator (admin only)
#[utoipa::path(
    delete,
    path = "/admin/moderators/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Staff ID")),
    responses(
        (status = 204, description = "Moderator deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Moderator not found")
    )
)]
pub async fn delete_moderator(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    ctx.require_admin()?;

    state.services.admin.delete_moderator(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Library endpoints: public views and owner-scoped management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{AddBookToCollection, BookDetails, Holding, UpdateBookDetails, UpdateCopies},
        library::{Library, LibrarySummary, UpdateLibrary},
    },
};

use super::{AuthenticatedPrincipal, OptionalPrincipal};

/// List all active libraries (map view)
#[utoipa::path(
    get,
    path = "/libraries",
    tag = "libraries",
    responses(
        (status = 200, description = "Active libraries", body = [LibrarySummary])
    )
)]
pub async fn list_libraries(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<LibrarySummary>>> {
    let libraries = state.services.libraries.list_active().await?;
    Ok(Json(libraries))
}

/// Details of a library
///
/// Anonymous callers only see active libraries; the owning account and
/// staff also see pending or deactivated ones.
#[utoipa::path(
    get,
    path = "/libraries/{id}",
    tag = "libraries",
    params(("id" = i64, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Library details", body = Library),
        (status = 404, description = "Library not found or not visible to the caller")
    )
)]
pub async fn get_library(
    State(state): State<crate::AppState>,
    OptionalPrincipal(ctx): OptionalPrincipal,
    Path(id): Path<i64>,
) -> AppResult<Json<Library>> {
    let privileged = ctx
        .map(|ctx| ctx.principal_id == id || ctx.require_staff().is_ok())
        .unwrap_or(false);

    let library = if privileged {
        state.services.libraries.get_own_details(id).await?
    } else {
        state.services.libraries.get_public_details(id).await?
    };
    Ok(Json(library))
}

/// Own details for the management screen, any lifecycle status
#[utoipa::path(
    get,
    path = "/libraries/{id}/manage",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Library details", body = Library),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the owner of this library")
    )
)]
pub async fn get_my_library(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path(id): Path<i64>,
) -> AppResult<Json<Library>> {
    ctx.require_ownership(id)?;

    let library = state.services.libraries.get_own_details(id).await?;
    Ok(Json(library))
}

/// Update own profile and address
#[utoipa::path(
    put,
    path = "/libraries/{id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    request_body = UpdateLibrary,
    responses(
        (status = 200, description = "Library updated", body = Library),
        (status = 400, description = "Invalid input or unresolvable address"),
        (status = 403, description = "Not the owner of this library")
    )
)]
pub async fn update_library(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path(id): Path<i64>,
    Json(update): Json<UpdateLibrary>,
) -> AppResult<Json<Library>> {
    ctx.require_ownership(id)?;
    update.validate()?;

    let library = state.services.libraries.update_profile(id, update).await?;
    Ok(Json(library))
}

/// Own holdings with copy counts
#[utoipa::path(
    get,
    path = "/libraries/{id}/books",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Holdings", body = [Holding]),
        (status = 403, description = "Not the owner of this library")
    )
)]
pub async fn list_holdings(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Holding>>> {
    ctx.require_ownership(id)?;

    let holdings = state.services.books.holdings(id).await?;
    Ok(Json(holdings))
}

/// Add a book to own holdings, creating it when the ISBN is new
#[utoipa::path(
    post,
    path = "/libraries/{id}/books",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    request_body = AddBookToCollection,
    responses(
        (status = 201, description = "Holding created", body = Holding),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not the owner of this library"),
        (status = 409, description = "Book already in the collection")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path(id): Path<i64>,
    Json(entry): Json<AddBookToCollection>,
) -> AppResult<(StatusCode, Json<Holding>)> {
    ctx.require_ownership(id)?;
    entry.validate()?;

    let holding = state.services.books.add_to_collection(id, entry).await?;
    Ok((StatusCode::CREATED, Json(holding)))
}

/// Update the copy count of a holding; zero removes it
#[utoipa::path(
    put,
    path = "/libraries/{id}/books/{book_id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateCopies,
    responses(
        (status = 200, description = "Holding updated; null body when the holding was removed"),
        (status = 403, description = "Not the owner of this library"),
        (status = 404, description = "Book not in the collection")
    )
)]
pub async fn update_copies(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path((id, book_id)): Path<(i64, i64)>,
    Json(update): Json<UpdateCopies>,
) -> AppResult<Json<Option<Holding>>> {
    ctx.require_ownership(id)?;
    update.validate()?;

    let holding = state
        .services
        .books
        .update_copies(id, book_id, update.copies)
        .await?;
    Ok(Json(holding))
}

/// Edit catalog data of a book in own holdings
#[utoipa::path(
    put,
    path = "/libraries/{id}/books/{book_id}/details",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateBookDetails,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 403, description = "Not the owner of this library"),
        (status = 404, description = "Book not in the collection")
    )
)]
pub async fn update_book_details(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path((id, book_id)): Path<(i64, i64)>,
    Json(update): Json<UpdateBookDetails>,
) -> AppResult<Json<BookDetails>> {
    ctx.require_ownership(id)?;
    update.validate()?;

    let details = state
        .services
        .books
        .update_book_details(id, book_id, update)
        .await?;
    Ok(Json(details))
}

/// Remove a book from own holdings
#[utoipa::path(
    delete,
    path = "/libraries/{id}/books/{book_id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Holding removed"),
        (status = 403, description = "Not the owner of this library"),
        (status = 404, description = "Book not in the collection")
    )
)]
pub async fn remove_book(
    State(state): State<crate::AppState>,
    AuthenticatedPrincipal(ctx): AuthenticatedPrincipal,
    Path((id, book_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    ctx.require_ownership(id)?;

    state.services.books.remove_from_collection(id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Public book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::book::{BookDetails, BookQuery, BookSummary, Genre, LibraryForBook, NearbyQuery},
};

use super::PaginatedResponse;

/// Search books by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books", body = PaginatedResponse<BookSummary>)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookSummary>>> {
    let (books, total) = state.services.books.search(&query).await?;

    Ok(Json(PaginatedResponse {
        items: books,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Books held by the most active libraries
#[utoipa::path(
    get,
    path = "/books/popular",
    tag = "books",
    responses(
        (status = 200, description = "Popular books", body = [BookSummary])
    )
)]
pub async fn popular_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.books.popular().await?;
    Ok(Json(books))
}

/// Book details with genres and similar titles
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookDetails>> {
    let details = state.services.books.details(id).await?;
    Ok(Json(details))
}

/// Active libraries holding a book, nearest first when coordinates are given
#[utoipa::path(
    get,
    path = "/books/{id}/libraries",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID"),
        NearbyQuery
    ),
    responses(
        (status = 200, description = "Libraries holding the book", body = [LibraryForBook]),
        (status = 404, description = "Book not found")
    )
)]
pub async fn libraries_for_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Query(nearby): Query<NearbyQuery>,
) -> AppResult<Json<Vec<LibraryForBook>>> {
    let libraries = state
        .services
        .books
        .libraries_for_book(id, nearby.lat, nearby.lon)
        .await?;
    Ok(Json(libraries))
}

/// Genre list
#[utoipa::path(
    get,
    path = "/genres",
    tag = "books",
    responses(
        (status = 200, description = "Genres", body = [Genre])
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.books.list_genres().await?;
    Ok(Json(genres))
}

//! Book, genre and holdings models

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

static ISBN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\d[- ]?){9,12}[\dXx]$").unwrap());

/// Book genre
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Full book record
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// List projection used by search and popular listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    /// Number of distinct active libraries holding the book; present only
    /// in the popular listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_count: Option<i64>,
}

/// Book details with genres and similar titles
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub genres: Vec<Genre>,
    pub similar: Vec<BookSummary>,
}

/// A holding: one book in one library's catalog, with its copy count
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Holding {
    pub book_id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub copies: i32,
}

/// An active library that holds a given book
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LibraryForBook {
    pub library_id: i64,
    pub trade_name: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub copies: i32,
    /// Distance from the caller in kilometers, when coordinates were given.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub distance_km: Option<f64>,
}

/// Request to add a book to the caller's holdings.
///
/// When the ISBN is unknown a new book record is created from these fields;
/// when it exists the existing record wins and only the holding is created.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddBookToCollection {
    #[validate(regex(path = *ISBN_RE, message = "Invalid ISBN"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    pub publisher: Option<String>,
    #[validate(range(min = 1400, max = 2100, message = "Invalid publication year"))]
    pub publication_year: Option<i16>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub genre_ids: Vec<i64>,
    #[validate(range(min = 1, message = "At least one copy is required"))]
    pub copies: i32,
}

/// Editable book fields (library-owned correction of catalog data)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookDetails {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    pub publisher: Option<String>,
    #[validate(range(min = 1400, max = 2100, message = "Invalid publication year"))]
    pub publication_year: Option<i16>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub genre_ids: Vec<i64>,
}

/// Copy count update; zero removes the holding.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCopies {
    #[validate(range(min = 0, message = "Copies cannot be negative"))]
    pub copies: i32,
}

/// Title search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub title: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Caller coordinates for proximity sorting
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

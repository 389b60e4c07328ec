//! Book catalog and holdings management

use crate::{
    error::{AppError, AppResult},
    models::book::{
        AddBookToCollection, BookDetails, BookQuery, BookSummary, Genre, Holding, LibraryForBook,
        UpdateBookDetails,
    },
    repository::Repository,
};

const POPULAR_LIMIT: i64 = 10;
const SIMILAR_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Paginated title search
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookSummary>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        self.repository
            .books
            .search_by_title(query.title.as_deref(), page, per_page)
            .await
    }

    /// Books held by the most distinct active libraries
    pub async fn popular(&self) -> AppResult<Vec<BookSummary>> {
        self.repository.books.popular(POPULAR_LIMIT).await
    }

    /// Details with genres and similar titles
    pub async fn details(&self, id: i64) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let genres = self.repository.books.genres_for_book(id).await?;
        let similar = self.repository.books.similar(id, SIMILAR_LIMIT).await?;
        Ok(BookDetails {
            book,
            genres,
            similar,
        })
    }

    /// Active libraries holding a book, sorted by proximity when the caller
    /// sent valid coordinates.
    pub async fn libraries_for_book(
        &self,
        book_id: i64,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> AppResult<Vec<LibraryForBook>> {
        // 404 for unknown books rather than an empty list
        self.repository.books.get_by_id(book_id).await?;

        let mut libraries = self.repository.books.libraries_for_book(book_id).await?;

        if let (Some(lat), Some(lon)) = (lat, lon) {
            if valid_coordinates(lat, lon) {
                sort_by_distance(&mut libraries, lat, lon);
            }
        }

        Ok(libraries)
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.books.list_genres().await
    }

    /// One library's holdings with copy counts
    pub async fn holdings(&self, library_id: i64) -> AppResult<Vec<Holding>> {
        self.repository.books.holdings_for_library(library_id).await
    }

    /// Add a book to a library's collection, creating the book record when
    /// the ISBN is not yet known.
    pub async fn add_to_collection(
        &self,
        library_id: i64,
        entry: AddBookToCollection,
    ) -> AppResult<Holding> {
        let book = match self.repository.books.get_by_isbn(&entry.isbn).await? {
            Some(book) => book,
            None => {
                self.repository.books.require_genres(&entry.genre_ids).await?;
                self.repository.books.create(&entry).await?
            }
        };

        if self
            .repository
            .books
            .holding_exists(library_id, book.id)
            .await?
        {
            return Err(AppError::Conflict(
                "Book is already in this library's collection".to_string(),
            ));
        }

        self.repository
            .books
            .create_holding(library_id, book.id, entry.copies)
            .await
    }

    /// Update the copy count of a holding; zero removes it.
    pub async fn update_copies(
        &self,
        library_id: i64,
        book_id: i64,
        copies: i32,
    ) -> AppResult<Option<Holding>> {
        if !self
            .repository
            .books
            .holding_exists(library_id, book_id)
            .await?
        {
            return Err(AppError::NotFound(
                "Book is not part of this library's collection".to_string(),
            ));
        }

        if copies == 0 {
            self.repository
                .books
                .delete_holding(library_id, book_id)
                .await?;
            return Ok(None);
        }

        self.repository
            .books
            .update_holding_copies(library_id, book_id, copies)
            .await
            .map(Some)
    }

    /// Edit catalog data of a book in the library's own collection
    pub async fn update_book_details(
        &self,
        library_id: i64,
        book_id: i64,
        update: UpdateBookDetails,
    ) -> AppResult<BookDetails> {
        if !self
            .repository
            .books
            .holding_exists(library_id, book_id)
            .await?
        {
            return Err(AppError::NotFound(
                "Book is not part of this library's collection".to_string(),
            ));
        }

        self.repository.books.require_genres(&update.genre_ids).await?;
        self.repository.books.update(book_id, &update).await?;
        self.details(book_id).await
    }

    pub async fn remove_from_collection(&self, library_id: i64, book_id: i64) -> AppResult<()> {
        if !self
            .repository
            .books
            .holding_exists(library_id, book_id)
            .await?
        {
            return Err(AppError::NotFound(
                "Book is not part of this library's collection".to_string(),
            ));
        }

        self.repository
            .books
            .delete_holding(library_id, book_id)
            .await
    }
}

fn valid_coordinates(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Sort libraries by great-circle distance from the caller, annotating each
/// entry with the computed distance.
fn sort_by_distance(libraries: &mut [LibraryForBook], lat: f64, lon: f64) {
    for library in libraries.iter_mut() {
        library.distance_km = Some(haversine_km(lat, lon, library.latitude, library.longitude));
    }
    libraries.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Great-circle distance between two points in kilometers
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library_at(id: i64, lat: f64, lon: f64) -> LibraryForBook {
        LibraryForBook {
            library_id: id,
            trade_name: format!("Library {}", id),
            city: "Test".to_string(),
            latitude: lat,
            longitude: lon,
            copies: 1,
            distance_km: None,
        }
    }

    #[test]
    fn haversine_known_distance() {
        // São Paulo to Rio de Janeiro is roughly 360 km
        let d = haversine_km(-23.5505, -46.6333, -22.9068, -43.1729);
        assert!((330.0..390.0).contains(&d), "got {}", d);
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine_km(10.0, 20.0, 10.0, 20.0) < 1e-9);
    }

    #[test]
    fn sorting_orders_nearest_first_and_annotates_distance() {
        let mut libraries = vec![
            library_at(1, -22.9068, -43.1729), // Rio, ~360 km away
            library_at(2, -23.5510, -46.6340), // a few blocks away
            library_at(3, -23.9618, -46.3322), // Santos, ~60 km away
        ];

        sort_by_distance(&mut libraries, -23.5505, -46.6333);

        let order: Vec<i64> = libraries.iter().map(|l| l.library_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(libraries.iter().all(|l| l.distance_km.is_some()));
    }

    #[test]
    fn coordinate_validation_bounds() {
        assert!(valid_coordinates(0.0, 0.0));
        assert!(valid_coordinates(-90.0, 180.0));
        assert!(!valid_coordinates(-91.0, 0.0));
        assert!(!valid_coordinates(0.0, 180.5));
    }
}

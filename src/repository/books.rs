//! Books, genres and holdings repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{
        AddBookToCollection, Book, BookSummary, Genre, Holding, LibraryForBook, UpdateBookDetails,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Paginated title search (partial, case-insensitive)
    pub async fn search_by_title(
        &self,
        title: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BookSummary>, i64)> {
        let pattern = format!("%{}%", title.unwrap_or(""));
        let offset = (page - 1) * per_page;

        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT id, isbn, title, author, cover_url, NULL::BIGINT AS library_count
            FROM books
            WHERE LOWER(title) LIKE LOWER($1)
            ORDER BY title
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE LOWER(title) LIKE LOWER($1)")
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        Ok((books, total))
    }

    /// Books ranked by how many distinct active libraries hold them
    pub async fn popular(&self, limit: i64) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.isbn, b.title, b.author, b.cover_url,
                   COUNT(DISTINCT l.id) AS library_count
            FROM books b
            JOIN library_books lb ON lb.book_id = b.id
            JOIN libraries l ON l.id = lb.library_id AND l.status = 'active'
            GROUP BY b.id
            ORDER BY library_count DESC, b.title
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        Ok(sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn genres_for_book(&self, book_id: i64) -> AppResult<Vec<Genre>> {
        Ok(sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Books sharing at least one genre with the given book
    pub async fn similar(&self, book_id: i64, limit: i64) -> AppResult<Vec<BookSummary>> {
        Ok(sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT DISTINCT b.id, b.isbn, b.title, b.author, b.cover_url,
                   NULL::BIGINT AS library_count
            FROM books b
            JOIN book_genres bg ON bg.book_id = b.id
            WHERE bg.genre_id IN (SELECT genre_id FROM book_genres WHERE book_id = $1)
              AND b.id != $1
            LIMIT $2
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        Ok(
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Resolve genre ids, failing on the first unknown one
    pub async fn require_genres(&self, genre_ids: &[i64]) -> AppResult<Vec<Genre>> {
        let mut genres = Vec::with_capacity(genre_ids.len());
        for &genre_id in genre_ids {
            let genre =
                sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
                    .bind(genre_id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Genre with id {} not found", genre_id))
                    })?;
            genres.push(genre);
        }
        Ok(genres)
    }

    /// Insert a new book with its genre links
    pub async fn create(&self, entry: &AddBookToCollection) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (isbn, title, author, publisher, publication_year, synopsis, cover_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&entry.isbn)
        .bind(&entry.title)
        .bind(&entry.author)
        .bind(&entry.publisher)
        .bind(entry.publication_year)
        .bind(&entry.synopsis)
        .bind(&entry.cover_url)
        .fetch_one(&mut *tx)
        .await?;

        for genre_id in &entry.genre_ids {
            sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_by_id(book_id).await
    }

    /// Update editable book fields and replace its genre links
    pub async fn update(&self, book_id: i64, update: &UpdateBookDetails) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author = $2, publisher = $3, publication_year = $4,
                synopsis = $5, cover_url = $6
            WHERE id = $7
            "#,
        )
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.publisher)
        .bind(update.publication_year)
        .bind(&update.synopsis)
        .bind(&update.cover_url)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;
        for genre_id in &update.genre_ids {
            sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_by_id(book_id).await
    }

    /// All holdings of one library
    pub async fn holdings_for_library(&self, library_id: i64) -> AppResult<Vec<Holding>> {
        Ok(sqlx::query_as::<_, Holding>(
            r#"
            SELECT b.id AS book_id, b.isbn, b.title, b.author, b.cover_url, lb.copies
            FROM library_books lb
            JOIN books b ON b.id = lb.book_id
            WHERE lb.library_id = $1
            ORDER BY b.title
            "#,
        )
        .bind(library_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_holding(&self, library_id: i64, book_id: i64) -> AppResult<Option<Holding>> {
        Ok(sqlx::query_as::<_, Holding>(
            r#"
            SELECT b.id AS book_id, b.isbn, b.title, b.author, b.cover_url, lb.copies
            FROM library_books lb
            JOIN books b ON b.id = lb.book_id
            WHERE lb.library_id = $1 AND lb.book_id = $2
            "#,
        )
        .bind(library_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn holding_exists(&self, library_id: i64, book_id: i64) -> AppResult<bool> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM library_books WHERE library_id = $1 AND book_id = $2)",
        )
        .bind(library_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn create_holding(
        &self,
        library_id: i64,
        book_id: i64,
        copies: i32,
    ) -> AppResult<Holding> {
        sqlx::query("INSERT INTO library_books (library_id, book_id, copies) VALUES ($1, $2, $3)")
            .bind(library_id)
            .bind(book_id)
            .bind(copies)
            .execute(&self.pool)
            .await?;

        self.get_holding(library_id, book_id).await?.ok_or_else(|| {
            AppError::Internal("Holding disappeared right after creation".to_string())
        })
    }

    pub async fn update_holding_copies(
        &self,
        library_id: i64,
        book_id: i64,
        copies: i32,
    ) -> AppResult<Holding> {
        sqlx::query(
            "UPDATE library_books SET copies = $1 WHERE library_id = $2 AND book_id = $3",
        )
        .bind(copies)
        .bind(library_id)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        self.get_holding(library_id, book_id).await?.ok_or_else(|| {
            AppError::NotFound("Book is not part of this library's collection".to_string())
        })
    }

    pub async fn delete_holding(&self, library_id: i64, book_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM library_books WHERE library_id = $1 AND book_id = $2")
            .bind(library_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Active libraries holding a given book
    pub async fn libraries_for_book(&self, book_id: i64) -> AppResult<Vec<LibraryForBook>> {
        Ok(sqlx::query_as::<_, LibraryForBook>(
            r#"
            SELECT l.id AS library_id, l.trade_name, a.city, a.latitude, a.longitude, lb.copies
            FROM library_books lb
            JOIN libraries l ON l.id = lb.library_id AND l.status = 'active'
            JOIN addresses a ON a.id = l.address_id
            WHERE lb.book_id = $1
            ORDER BY l.trade_name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn count_books(&self) -> AppResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn total_copies(&self) -> AppResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COALESCE(SUM(copies), 0)::BIGINT FROM library_books")
                .fetch_one(&self.pool)
                .await?,
        )
    }
}

//! Repository layer for database operations

pub mod books;
pub mod credentials;
pub mod libraries;
pub mod staff;

use sqlx::{Pool, Postgres};

pub use credentials::{CredentialStore, CredentialsRepository};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub credentials: CredentialsRepository,
    pub libraries: libraries::LibrariesRepository,
    pub books: books::BooksRepository,
    pub staff: staff::StaffRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            credentials: CredentialsRepository::new(pool.clone()),
            libraries: libraries::LibrariesRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            staff: staff::StaffRepository::new(pool.clone()),
            pool,
        }
    }
}

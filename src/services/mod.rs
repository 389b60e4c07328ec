//! Business logic services

pub mod admin;
pub mod auth;
pub mod books;
pub mod geocoding;
pub mod libraries;

use std::sync::Arc;

use crate::{
    auth::{ConfigurationError, TokenCodec},
    config::AppConfig,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub libraries: libraries::LibraryService,
    pub books: books::BookService,
    pub admin: admin::AdminService,
}

impl Services {
    /// Create all services with the given repository.
    ///
    /// Fails when the signing key is unusable; callers abort startup on
    /// that error rather than serving with a weak key.
    pub fn new(repository: Repository, config: &AppConfig) -> Result<Self, ConfigurationError> {
        let codec = TokenCodec::new(&config.auth.jwt_secret, config.auth.jwt_expiration_hours)?;
        let geocoding = geocoding::GeocodingService::new(config.geocoding.clone());

        Ok(Self {
            auth: auth::AuthService::new(Arc::new(repository.credentials.clone()), codec),
            libraries: libraries::LibraryService::new(repository.clone(), geocoding),
            books: books::BookService::new(repository.clone()),
            admin: admin::AdminService::new(repository),
        })
    }
}

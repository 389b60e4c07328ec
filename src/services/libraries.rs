//! Library registration and profile management

use crate::{
    auth::password,
    error::{AppError, AppResult},
    models::library::{Library, LibraryStatus, LibrarySummary, RegisterLibrary, UpdateLibrary},
    repository::Repository,
    services::geocoding::{Coordinates, GeocodingService},
};

#[derive(Clone)]
pub struct LibraryService {
    repository: Repository,
    geocoding: GeocodingService,
}

impl LibraryService {
    pub fn new(repository: Repository, geocoding: GeocodingService) -> Self {
        Self {
            repository,
            geocoding,
        }
    }

    /// Register a new library. The record starts `pending` and cannot
    /// authenticate until a staff member approves it.
    pub async fn register(&self, registration: RegisterLibrary) -> AppResult<Library> {
        if self
            .repository
            .libraries
            .email_exists(&registration.email)
            .await?
        {
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }
        if self
            .repository
            .libraries
            .registration_number_exists(&registration.registration_number)
            .await?
        {
            return Err(AppError::Conflict(
                "Registration number is already in use".to_string(),
            ));
        }

        let coords = self.resolve_address(&registration).await?;

        let password_hash = password::hash_password_blocking(registration.password.clone()).await?;

        let library = self
            .repository
            .libraries
            .create(&registration, &password_hash, coords.latitude, coords.longitude)
            .await?;

        tracing::info!(
            library_id = library.id,
            trade_name = %library.trade_name,
            "library registered, awaiting approval"
        );

        Ok(library)
    }

    async fn resolve_address(&self, registration: &RegisterLibrary) -> AppResult<Coordinates> {
        self.geocoding
            .resolve(&registration.address)
            .await?
            .ok_or_else(|| {
                AppError::Validation(
                    "Address could not be resolved. Check the submitted fields.".to_string(),
                )
            })
    }

    /// Active libraries for the public map view
    pub async fn list_active(&self) -> AppResult<Vec<LibrarySummary>> {
        self.repository.libraries.list_active().await
    }

    /// Public details; non-active libraries are invisible here.
    pub async fn get_public_details(&self, id: i64) -> AppResult<Library> {
        let library = self.repository.libraries.get_by_id(id).await?;
        if library.status != LibraryStatus::Active {
            return Err(AppError::NotFound("Library not available".to_string()));
        }
        Ok(library)
    }

    /// Own details, visible in any lifecycle status. Callers must have
    /// checked ownership already.
    pub async fn get_own_details(&self, id: i64) -> AppResult<Library> {
        self.repository.libraries.get_by_id(id).await
    }

    /// Update profile and address; the address is re-geocoded.
    pub async fn update_profile(&self, id: i64, update: UpdateLibrary) -> AppResult<Library> {
        // Existence check up front so a bad id is a 404, not a geocoding trip
        self.repository.libraries.get_by_id(id).await?;

        let coords = self
            .geocoding
            .resolve(&update.address)
            .await?
            .ok_or_else(|| {
                AppError::Validation(
                    "Address could not be resolved. Check the submitted fields.".to_string(),
                )
            })?;

        self.repository
            .libraries
            .update_profile(id, &update, coords.latitude, coords.longitude)
            .await
    }
}

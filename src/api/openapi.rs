//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, books, health, libraries};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocaLibrary API",
        version = "1.0.0",
        description = "Library Locator System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        // Libraries
        libraries::list_libraries,
        libraries::get_library,
        libraries::get_my_library,
        libraries::update_library,
        libraries::list_holdings,
        libraries::add_book,
        libraries::update_copies,
        libraries::update_book_details,
        libraries::remove_book,
        // Books
        books::search_books,
        books::popular_books,
        books::get_book,
        books::libraries_for_book,
        books::list_genres,
        // Admin
        admin::dashboard,
        admin::list_libraries,
        admin::update_library_status,
        admin::delete_library,
        admin::create_moderator,
        admin::list_moderators,
        admin::update_moderator_status,
        admin::delete_moderator,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::auth::context::AuthContext,
            crate::auth::principal::Role,
            crate::auth::principal::PrincipalType,
            crate::auth::principal::StaffRole,
            // Libraries
            crate::models::library::Library,
            crate::models::library::LibrarySummary,
            crate::models::library::LibraryStatus,
            crate::models::library::Address,
            crate::models::library::AddressInput,
            crate::models::library::RegisterLibrary,
            crate::models::library::UpdateLibrary,
            crate::models::library::UpdateLibraryStatus,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetails,
            crate::models::book::Genre,
            crate::models::book::Holding,
            crate::models::book::LibraryForBook,
            crate::models::book::AddBookToCollection,
            crate::models::book::UpdateBookDetails,
            crate::models::book::UpdateCopies,
            // Staff
            crate::models::staff::StaffAccount,
            crate::models::staff::CreateModerator,
            crate::models::staff::UpdateStaffStatus,
            // Admin
            admin::DashboardResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "libraries", description = "Library directory and owner management"),
        (name = "books", description = "Public book catalog"),
        (name = "admin", description = "Staff operations")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

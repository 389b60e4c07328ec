//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    auth::AuthContext,
    error::AppResult,
    models::library::{Library, RegisterLibrary},
};

use super::AuthenticatedPrincipal;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Log in as a library or staff account
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request.validate()?;

    let issued = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}

/// Register a new library (starts pending approval)
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterLibrary,
    responses(
        (status = 201, description = "Library registered, awaiting approval", body = Library),
        (status = 400, description = "Invalid input or unresolvable address"),
        (status = 409, description = "Email or registration number already in use"),
        (status = 503, description = "Geocoding service unavailable")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(registration): Json<RegisterLibrary>,
) -> AppResult<(StatusCode, Json<Library>)> {
    registration.validate()?;

    let library = state.services.libraries.register(registration).await?;
    Ok((StatusCode::CREATED, Json(library)))
}

/// Identity attached to the current request
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current principal", body = AuthContext),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedPrincipal(ctx): AuthenticatedPrincipal) -> Json<AuthContext> {
    Json(ctx)
}

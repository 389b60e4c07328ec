//! Library model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

static ZIP_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}-?\d{3}$").unwrap());
static REGISTRATION_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{14}$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d{8,15}$").unwrap());

/// Library lifecycle status.
///
/// New registrations start as `pending`; only `active` libraries are
/// publicly visible and only their accounts can authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LibraryStatus {
    Pending,
    Active,
    Inactive,
}

impl LibraryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryStatus::Pending => "pending",
            LibraryStatus::Active => "active",
            LibraryStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for LibraryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LibraryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LibraryStatus::Pending),
            "active" => Ok(LibraryStatus::Active),
            "inactive" => Ok(LibraryStatus::Inactive),
            _ => Err(format!("Invalid library status: {}", s)),
        }
    }
}

// SQLx conversion for LibraryStatus (stored as text)
impl sqlx::Type<Postgres> for LibraryStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LibraryStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LibraryStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Geocoded postal address
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: i64,
    pub zip_code: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Flat row as returned by library queries joined with addresses
#[derive(Debug, Clone, FromRow)]
pub struct LibraryRow {
    pub id: i64,
    pub trade_name: String,
    pub legal_name: String,
    pub registration_number: String,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub website: Option<String>,
    pub photo_url: Option<String>,
    pub status: LibraryStatus,
    pub created_at: DateTime<Utc>,
    pub address_id: i64,
    pub zip_code: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LibraryRow> for Library {
    fn from(row: LibraryRow) -> Self {
        Library {
            id: row.id,
            trade_name: row.trade_name,
            legal_name: row.legal_name,
            registration_number: row.registration_number,
            phone: row.phone,
            category: row.category,
            website: row.website,
            photo_url: row.photo_url,
            status: row.status,
            created_at: row.created_at,
            address: Address {
                id: row.address_id,
                zip_code: row.zip_code,
                street: row.street,
                number: row.number,
                complement: row.complement,
                district: row.district,
                city: row.city,
                state: row.state,
                latitude: row.latitude,
                longitude: row.longitude,
            },
        }
    }
}

/// Full library record
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Library {
    pub id: i64,
    pub trade_name: String,
    pub legal_name: String,
    pub registration_number: String,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub website: Option<String>,
    pub photo_url: Option<String>,
    pub status: LibraryStatus,
    pub created_at: DateTime<Utc>,
    pub address: Address,
}

/// Map-view projection of an active library
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LibrarySummary {
    pub id: i64,
    pub trade_name: String,
    pub category: Option<String>,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Address fields as submitted by clients; coordinates come from geocoding.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddressInput {
    #[validate(regex(path = *ZIP_CODE_RE, message = "Invalid zip code"))]
    pub zip_code: String,
    #[validate(length(min = 1, max = 255))]
    pub street: String,
    #[validate(length(min = 1, max = 16))]
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub city: String,
    #[validate(length(min = 1, max = 64))]
    pub state: String,
}

/// Library self-registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterLibrary {
    #[validate(length(min = 1, max = 255))]
    pub trade_name: String,
    #[validate(length(min = 1, max = 255))]
    pub legal_name: String,
    #[validate(regex(path = *REGISTRATION_NUMBER_RE, message = "Invalid registration number"))]
    pub registration_number: String,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    pub category: Option<String>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, max = 255, message = "Password must be 6-255 characters"))]
    pub password: String,
    #[validate(nested)]
    pub address: AddressInput,
}

/// Library profile update (own account)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLibrary {
    #[validate(length(min = 1, max = 255))]
    pub trade_name: String,
    #[validate(length(min = 1, max = 255))]
    pub legal_name: String,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    pub category: Option<String>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
    pub photo_url: Option<String>,
    #[validate(nested)]
    pub address: AddressInput,
}

/// Status change request (staff)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLibraryStatus {
    pub status: LibraryStatus,
}

/// Admin listing filter
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LibraryQuery {
    pub status: Option<LibraryStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

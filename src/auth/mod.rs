//! Authentication and authorization core
//!
//! Stateless token-based identity: credentials are checked once at login,
//! everything a request needs afterwards travels inside the signed token.

pub mod context;
pub mod password;
pub mod principal;
pub mod token;

pub use context::AuthContext;
pub use principal::{Principal, PrincipalType, Role, StaffRole};
pub use token::{Claims, ConfigurationError, IssuedToken, TokenCodec, TokenError};

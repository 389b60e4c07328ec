//! Signed token codec: issuing and verifying HS256 bearer tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::{Principal, PrincipalType, Role};

/// Minimum signing key length in bytes. HS256 keys below the hash output
/// size are brute-forceable; refusing to start beats degrading silently.
pub const MIN_SECRET_LEN: usize = 32;

/// Fatal startup-only configuration failure.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("JWT signing key must be at least 32 bytes, got {0}")]
    WeakSigningKey(usize),
}

/// Token verification failure, one variant per rejection cause.
///
/// The split exists for logging and tests; every variant collapses to the
/// same unauthenticated outcome at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed or unsupported token")]
    Malformed,
    #[error("missing required claim: {0}")]
    MissingClaim(&'static str),
    #[error("failed to encode token: {0}")]
    EncodingFailed(String),
}

/// Claims carried by a verified token.
///
/// Field access is infallible once [`TokenCodec::verify`] has returned the
/// value: every claim is checked for presence during verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's email.
    pub sub: String,
    /// Principal id (library id or staff id).
    pub uid: i64,
    pub role: Role,
    #[serde(rename = "typ")]
    pub principal_type: PrincipalType,
    pub iat: i64,
    pub exp: i64,
}

/// Decode-side view with every claim optional, so an absent claim can be
/// reported as [`TokenError::MissingClaim`] instead of a generic parse error.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    uid: Option<i64>,
    role: Option<Role>,
    #[serde(rename = "typ")]
    principal_type: Option<PrincipalType>,
    iat: Option<i64>,
    exp: Option<i64>,
}

impl TryFrom<RawClaims> for Claims {
    type Error = TokenError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        Ok(Claims {
            sub: raw.sub.ok_or(TokenError::MissingClaim("sub"))?,
            uid: raw.uid.ok_or(TokenError::MissingClaim("uid"))?,
            role: raw.role.ok_or(TokenError::MissingClaim("role"))?,
            principal_type: raw
                .principal_type
                .ok_or(TokenError::MissingClaim("typ"))?,
            iat: raw.iat.ok_or(TokenError::MissingClaim("iat"))?,
            exp: raw.exp.ok_or(TokenError::MissingClaim("exp"))?,
        })
    }
}

/// A freshly issued token together with its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Issues and verifies signed bearer tokens.
///
/// The signing key is loaded once at startup and never mutated; the codec is
/// freely shareable across request tasks.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from the configured secret and TTL.
    ///
    /// Fails when the key is below [`MIN_SECRET_LEN`] bytes; callers are
    /// expected to abort startup on this error.
    pub fn new(secret: &str, ttl_hours: u64) -> Result<Self, ConfigurationError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigurationError::WeakSigningKey(secret.len()));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours as i64),
        })
    }

    /// Token lifetime in whole seconds.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for an authenticated principal.
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.email().to_string(),
            uid: principal.id(),
            role: principal.role(),
            principal_type: principal.principal_type(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.issue_claims(&claims)
    }

    fn issue_claims(&self, claims: &Claims) -> Result<IssuedToken, TokenError> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;
        Ok(IssuedToken {
            token,
            expires_in: self.ttl_seconds(),
        })
    }

    /// Verify a token string: signature, claim presence, then expiry.
    ///
    /// Expiry is checked here rather than delegated to the JWT library so
    /// that a missing `exp` is reported as a missing claim and no clock-skew
    /// leeway is applied. Side-effect free: verifying the same token twice
    /// yields the same result.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<RawClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = Claims::try_from(data.claims)?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::principal::StaffRole;

    const SECRET: &str = "unit-test-signing-key-0123456789abcdef";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, 24).unwrap()
    }

    fn library_principal() -> Principal {
        Principal::Library {
            id: 42,
            email: "biblioteca@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            active: true,
        }
    }

    /// Encode arbitrary claims with the test secret, bypassing the codec.
    fn raw_token(claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn rejects_weak_signing_key() {
        let err = TokenCodec::new("too-short", 24).unwrap_err();
        assert!(matches!(err, ConfigurationError::WeakSigningKey(9)));
    }

    #[test]
    fn issue_verify_roundtrip_preserves_claims() {
        let codec = codec();
        let issued = codec.issue(&library_principal()).unwrap();
        assert_eq!(issued.expires_in, 24 * 3600);

        let claims = codec.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "biblioteca@x.com");
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.role, Role::Library);
        assert_eq!(claims.principal_type, PrincipalType::Library);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn staff_token_carries_tier_role() {
        let codec = codec();
        let admin = Principal::Staff {
            id: 7,
            email: "admin@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: StaffRole::Admin,
            enabled: true,
        };
        let claims = codec.verify(&codec.issue(&admin).unwrap().token).unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.principal_type, PrincipalType::Staff);
    }

    #[test]
    fn verify_is_idempotent() {
        let codec = codec();
        let issued = codec.issue(&library_principal()).unwrap();
        let first = codec.verify(&issued.token).unwrap();
        let second = codec.verify(&issued.token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn token_valid_one_second_before_expiry() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let token = raw_token(&serde_json::json!({
            "sub": "biblioteca@x.com", "uid": 42, "role": "ROLE_LIBRARY",
            "typ": "LIBRARY", "iat": now - 100, "exp": now + 1,
        }));
        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn token_rejected_one_second_after_expiry() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let token = raw_token(&serde_json::json!({
            "sub": "biblioteca@x.com", "uid": 42, "role": "ROLE_LIBRARY",
            "typ": "LIBRARY", "iat": now - 100, "exp": now - 1,
        }));
        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn expired_token_with_valid_signature_is_expired_not_invalid() {
        // Expiry is checked on top of, not instead of, the signature check.
        let codec = codec();
        let now = Utc::now().timestamp();
        let token = raw_token(&serde_json::json!({
            "sub": "biblioteca@x.com", "uid": 42, "role": "ROLE_LIBRARY",
            "typ": "LIBRARY", "iat": now - 7200, "exp": now - 3600,
        }));
        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn tampered_signature_is_rejected_as_signature_error() {
        let codec = codec();
        let issued = codec.issue(&library_principal()).unwrap();

        let (head, sig) = issued.token.rsplit_once('.').unwrap();
        let flipped: String = sig
            .chars()
            .enumerate()
            .map(|(i, c)| if i == 0 { if c == 'A' { 'B' } else { 'A' } } else { c })
            .collect();
        let tampered = format!("{}.{}", head, flipped);

        assert_eq!(
            codec.verify(&tampered).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let codec = codec();
        let other = TokenCodec::new("another-signing-key-0123456789abcdef", 24).unwrap();
        let issued = other.issue(&library_principal()).unwrap();
        assert_eq!(
            codec.verify(&issued.token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.verify("garbage").unwrap_err(), TokenError::Malformed);
        assert_eq!(
            codec.verify("still.not-a.token").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn absent_claims_are_reported_by_name() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let token = raw_token(&serde_json::json!({
            "sub": "biblioteca@x.com", "role": "ROLE_LIBRARY",
            "typ": "LIBRARY", "iat": now, "exp": now + 3600,
        }));
        assert_eq!(
            codec.verify(&token).unwrap_err(),
            TokenError::MissingClaim("uid")
        );
    }

    #[test]
    fn unknown_role_value_is_malformed() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let token = raw_token(&serde_json::json!({
            "sub": "biblioteca@x.com", "uid": 42, "role": "ROLE_SUPERUSER",
            "typ": "LIBRARY", "iat": now, "exp": now + 3600,
        }));
        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Malformed);
    }
}

//! Password hashing and verification (Argon2id)

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, AppResult};

/// Hash a plaintext password into a PHC string.
///
/// Parameters (memory, iterations, lanes) are the argon2 crate defaults and
/// are embedded in the resulting hash, so they can be tuned without
/// invalidating stored credentials.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch; an error only when the stored hash
/// itself cannot be parsed. The plaintext is never logged.
pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Verify on the blocking pool.
///
/// Argon2 verification is CPU-bound in the hundred-millisecond range; running
/// it on a worker thread would stall unrelated requests scheduled behind it.
pub async fn verify_password_blocking(password: String, stored_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}

/// Hash on the blocking pool, see [`verify_password_blocking`].
pub async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("s3cret-password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-password", &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_a_clean_mismatch() {
        let hash = hash_password("correct").unwrap();
        assert!(!verify_password("incorrect", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_stored_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers_agree_with_sync_versions() {
        let hash = hash_password_blocking("pw".to_string()).await.unwrap();
        assert!(
            verify_password_blocking("pw".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !verify_password_blocking("other".to_string(), hash)
                .await
                .unwrap()
        );
    }
}

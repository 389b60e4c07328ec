//! Authentication service: the single entry point for login

use std::sync::Arc;

use crate::{
    auth::{password, Claims, IssuedToken, TokenCodec, TokenError},
    error::{AppError, AppResult},
    repository::CredentialStore,
};

/// One message for both "unknown email" and "wrong password", so responses
/// cannot be used to enumerate registered emails.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, codec: TokenCodec) -> Self {
        Self { credentials, codec }
    }

    /// Authenticate an email/password pair and issue a bearer token.
    ///
    /// Lookup → password check → enablement check → issue. The first two
    /// rejections are indistinguishable to the caller; a disabled account
    /// gets its own message since its owner already knows it exists.
    /// Internal causes are kept in the logs only.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedToken> {
        let principal = match self.credentials.find_principal_by_email(email).await? {
            Some(principal) => principal,
            None => {
                tracing::warn!(email, "login rejected: unknown email");
                return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        let password_valid = password::verify_password_blocking(
            password.to_string(),
            principal.password_hash().to_string(),
        )
        .await?;
        if !password_valid {
            tracing::warn!(email, "login rejected: password mismatch");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        if !principal.is_enabled() {
            tracing::warn!(
                email,
                principal_type = %principal.principal_type(),
                "login rejected: account not active"
            );
            return Err(AppError::Authentication(
                "Account is not active. Contact an administrator.".to_string(),
            ));
        }

        let issued = self
            .codec
            .issue(&principal)
            .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))?;

        tracing::info!(
            email,
            principal_id = principal.id(),
            principal_type = %principal.principal_type(),
            "login successful"
        );

        Ok(issued)
    }

    /// Verify a bearer token, returning its claims.
    ///
    /// The typed error is for logging; callers translate every variant into
    /// the same unauthenticated response.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.codec.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        principal::{Principal, PrincipalType, Role, StaffRole},
        password::hash_password,
    };
    use crate::repository::credentials::MockCredentialStore;

    const SECRET: &str = "auth-service-test-key-0123456789abcdef";

    fn service(mock: MockCredentialStore) -> AuthService {
        AuthService::new(Arc::new(mock), TokenCodec::new(SECRET, 24).unwrap())
    }

    fn library_principal(password: &str, active: bool) -> Principal {
        Principal::Library {
            id: 42,
            email: "biblioteca@x.com".to_string(),
            password_hash: hash_password(password).unwrap(),
            active,
        }
    }

    fn staff_principal(password: &str, role: StaffRole, enabled: bool) -> Principal {
        Principal::Staff {
            id: 7,
            email: "admin@x.com".to_string(),
            password_hash: hash_password(password).unwrap(),
            role,
            enabled,
        }
    }

    fn expect_lookup(principal: Option<Principal>) -> MockCredentialStore {
        let mut mock = MockCredentialStore::new();
        mock.expect_find_principal_by_email()
            .returning(move |_| Ok(principal.clone()));
        mock
    }

    #[tokio::test]
    async fn successful_library_login_issues_decodable_token() {
        let service = service(expect_lookup(Some(library_principal("pw123456", true))));

        let issued = service.login("biblioteca@x.com", "pw123456").await.unwrap();
        assert_eq!(issued.expires_in, 24 * 3600);

        let claims = service.verify_token(&issued.token).unwrap();
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.sub, "biblioteca@x.com");
        assert_eq!(claims.role, Role::Library);
        assert_eq!(claims.principal_type, PrincipalType::Library);
    }

    #[tokio::test]
    async fn staff_login_carries_tier_role() {
        let service = service(expect_lookup(Some(staff_principal(
            "pw123456",
            StaffRole::Moderator,
            true,
        ))));

        let issued = service.login("admin@x.com", "pw123456").await.unwrap();
        let claims = service.verify_token(&issued.token).unwrap();
        assert_eq!(claims.role, Role::Moderator);
        assert_eq!(claims.principal_type, PrincipalType::Staff);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let unknown = service(expect_lookup(None))
            .login("nobody@x.com", "whatever")
            .await
            .unwrap_err();

        let mismatch = service(expect_lookup(Some(library_principal("right-pw", true))))
            .login("biblioteca@x.com", "wrong-pw")
            .await
            .unwrap_err();

        let (unknown_msg, mismatch_msg) = match (unknown, mismatch) {
            (AppError::Authentication(a), AppError::Authentication(b)) => (a, b),
            other => panic!("expected authentication errors, got {:?}", other),
        };
        assert_eq!(unknown_msg, mismatch_msg);
    }

    #[tokio::test]
    async fn inactive_library_cannot_login_even_with_correct_password() {
        let service = service(expect_lookup(Some(library_principal("pw123456", false))));

        let err = service
            .login("biblioteca@x.com", "pw123456")
            .await
            .unwrap_err();
        match err {
            AppError::Authentication(msg) => {
                assert_ne!(msg, INVALID_CREDENTIALS);
                assert!(msg.contains("not active"));
            }
            other => panic!("expected authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn disabled_staff_cannot_login() {
        let service = service(expect_lookup(Some(staff_principal(
            "pw123456",
            StaffRole::Admin,
            false,
        ))));

        assert!(matches!(
            service.login("admin@x.com", "pw123456").await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn wrong_password_on_disabled_account_reports_invalid_credentials() {
        // Password is checked before enablement, so a wrong password never
        // reveals that the account is disabled.
        let service = service(expect_lookup(Some(library_principal("right-pw", false))));

        let err = service
            .login("biblioteca@x.com", "wrong-pw")
            .await
            .unwrap_err();
        match err {
            AppError::Authentication(msg) => assert_eq!(msg, INVALID_CREDENTIALS),
            other => panic!("expected authentication error, got {:?}", other),
        }
    }
}

//! Per-request authorization context and check primitives

use serde::Serialize;
use utoipa::ToSchema;

use super::principal::{PrincipalType, Role};
use super::token::Claims;
use crate::error::{AppError, AppResult};

/// Identity attached to a request after its bearer token verified.
///
/// Built once per request by the extractor in `api::mod` and dropped with
/// the request; it is a plain value passed to whoever needs it, never stored
/// in ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct AuthContext {
    pub principal_id: i64,
    pub role: Role,
    pub principal_type: PrincipalType,
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            principal_id: claims.uid,
            role: claims.role,
            principal_type: claims.principal_type,
        }
    }
}

impl AuthContext {
    /// The caller may only manage resources belonging to its own identity.
    ///
    /// Role is deliberately not consulted: a staff token for id 7 is just as
    /// rejected when touching library 42 as a library token would be.
    pub fn require_ownership(&self, resource_owner_id: i64) -> AppResult<()> {
        if self.principal_id == resource_owner_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You do not have permission to manage this resource".to_string(),
            ))
        }
    }

    /// Gate an operation to the given roles.
    pub fn require_role(&self, allowed: &[Role]) -> AppResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Operation requires one of: {}",
                allowed
                    .iter()
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }

    /// Admin or moderator.
    pub fn require_staff(&self) -> AppResult<()> {
        self.require_role(&[Role::Admin, Role::Moderator])
    }

    /// Admin only.
    pub fn require_admin(&self) -> AppResult<()> {
        self.require_role(&[Role::Admin])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn ctx(principal_id: i64, role: Role) -> AuthContext {
        AuthContext {
            principal_id,
            role,
            principal_type: match role {
                Role::Library => PrincipalType::Library,
                _ => PrincipalType::Staff,
            },
        }
    }

    #[test]
    fn ownership_succeeds_only_on_matching_id() {
        assert!(ctx(7, Role::Library).require_ownership(7).is_ok());
        assert!(matches!(
            ctx(7, Role::Library).require_ownership(42),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn ownership_mismatch_rejected_regardless_of_role() {
        for role in [Role::Library, Role::Admin, Role::Moderator] {
            assert!(matches!(
                ctx(7, role).require_ownership(42),
                Err(AppError::Authorization(_))
            ));
        }
    }

    #[test]
    fn ownership_mismatch_always_raises_authorization_error() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let principal_id: i64 = rng.gen_range(1..1_000_000);
            let mut resource_id: i64 = rng.gen_range(1..1_000_000);
            if resource_id == principal_id {
                resource_id += 1;
            }
            assert!(matches!(
                ctx(principal_id, Role::Library).require_ownership(resource_id),
                Err(AppError::Authorization(_))
            ));
        }
    }

    #[test]
    fn role_gate_matches_membership() {
        let staff_only = [Role::Admin, Role::Moderator];
        assert!(ctx(1, Role::Admin).require_role(&staff_only).is_ok());
        assert!(ctx(1, Role::Moderator).require_role(&staff_only).is_ok());
        assert!(matches!(
            ctx(1, Role::Library).require_role(&staff_only),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn admin_gate_excludes_moderators() {
        assert!(ctx(1, Role::Admin).require_admin().is_ok());
        assert!(ctx(1, Role::Moderator).require_admin().is_err());
        assert!(ctx(1, Role::Library).require_admin().is_err());
    }
}

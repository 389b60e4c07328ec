//! Principal model: the two account families that can authenticate

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Granted role, as carried inside issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "ROLE_LIBRARY")]
    Library,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_MODERATOR")]
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Library => "ROLE_LIBRARY",
            Role::Admin => "ROLE_ADMIN",
            Role::Moderator => "ROLE_MODERATOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which account family a principal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PrincipalType {
    #[serde(rename = "LIBRARY")]
    Library,
    #[serde(rename = "STAFF")]
    Staff,
}

impl PrincipalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalType::Library => "LIBRARY",
            PrincipalType::Staff => "STAFF",
        }
    }
}

impl std::fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Staff privilege tier, stored in `staff_accounts.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum StaffRole {
    Admin,
    Moderator,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "ADMIN",
            StaffRole::Moderator => "MODERATOR",
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(StaffRole::Admin),
            "MODERATOR" => Ok(StaffRole::Moderator),
            _ => Err(format!("Invalid staff role: {}", s)),
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An identity loaded from one of the two credential tables.
///
/// The two families are structurally different: a library account derives
/// its `active` flag from the owning library's lifecycle status, while a
/// staff account carries an independent `enabled` flag and a privilege tier.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Library {
        id: i64,
        email: String,
        password_hash: String,
        /// True iff the owning library is in the `active` lifecycle status.
        active: bool,
    },
    Staff {
        id: i64,
        email: String,
        password_hash: String,
        role: StaffRole,
        enabled: bool,
    },
}

impl Principal {
    pub fn id(&self) -> i64 {
        match self {
            Principal::Library { id, .. } | Principal::Staff { id, .. } => *id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::Library { email, .. } | Principal::Staff { email, .. } => email,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Principal::Library { password_hash, .. }
            | Principal::Staff { password_hash, .. } => password_hash,
        }
    }

    pub fn principal_type(&self) -> PrincipalType {
        match self {
            Principal::Library { .. } => PrincipalType::Library,
            Principal::Staff { .. } => PrincipalType::Staff,
        }
    }

    /// The role this principal's token will carry.
    pub fn role(&self) -> Role {
        match self {
            Principal::Library { .. } => Role::Library,
            Principal::Staff { role, .. } => match role {
                StaffRole::Admin => Role::Admin,
                StaffRole::Moderator => Role::Moderator,
            },
        }
    }

    /// Whether the account may log in right now.
    pub fn is_enabled(&self) -> bool {
        match self {
            Principal::Library { active, .. } => *active,
            Principal::Staff { enabled, .. } => *enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(active: bool) -> Principal {
        Principal::Library {
            id: 1,
            email: "lib@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            active,
        }
    }

    fn staff(role: StaffRole, enabled: bool) -> Principal {
        Principal::Staff {
            id: 2,
            email: "staff@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role,
            enabled,
        }
    }

    #[test]
    fn library_principal_maps_to_library_role() {
        let p = library(true);
        assert_eq!(p.role(), Role::Library);
        assert_eq!(p.principal_type(), PrincipalType::Library);
    }

    #[test]
    fn staff_tier_maps_to_matching_role() {
        assert_eq!(staff(StaffRole::Admin, true).role(), Role::Admin);
        assert_eq!(staff(StaffRole::Moderator, true).role(), Role::Moderator);
        assert_eq!(
            staff(StaffRole::Admin, true).principal_type(),
            PrincipalType::Staff
        );
    }

    #[test]
    fn enablement_follows_the_family_specific_flag() {
        assert!(library(true).is_enabled());
        assert!(!library(false).is_enabled());
        assert!(staff(StaffRole::Moderator, true).is_enabled());
        assert!(!staff(StaffRole::Admin, false).is_enabled());
    }

    #[test]
    fn role_wire_values() {
        assert_eq!(
            serde_json::to_string(&Role::Library).unwrap(),
            "\"ROLE_LIBRARY\""
        );
        assert_eq!(
            serde_json::to_string(&Role::Moderator).unwrap(),
            "\"ROLE_MODERATOR\""
        );
        assert_eq!(
            serde_json::to_string(&PrincipalType::Staff).unwrap(),
            "\"STAFF\""
        );
    }
}

//! User (principal) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of roles a principal can hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    /// Regular member of a tenant.
    Member,
    /// Tenant administrator.
    Admin,
    /// Platform operator. Never bound to a tenant and never able to
    /// access tenant-scoped data.
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "member" => Some(Role::Member),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

/// An authenticated actor: an end user within a tenant, or a platform
/// operator with no tenant binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique, normalized (lowercase, trimmed) email address.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// `None` during the two-step signup flow and always `None` for
    /// superadmins. Once set, only the privileged reassignment path may
    /// change it.
    pub tenant_id: Option<Uuid>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Platform principals operate outside any tenant.
    pub fn is_platform(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn is_tenant_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields required to create a new user.
///
/// The password is hashed by the auth layer before this struct is built;
/// raw passwords never reach the repository.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub tenant_id: Option<Uuid>,
    pub role: Role,
}

/// Fields that can be updated on an existing user.
///
/// There is deliberately no tenant field here: tenant assignment is a
/// dedicated one-shot operation and can never ride along on a profile
/// update.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Normalize an email for storage and lookup: trim whitespace, lowercase.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn role_round_trip() {
        for role in [Role::Member, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
    }
}

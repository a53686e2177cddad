//! Tenant domain model.
//!
//! A tenant is an isolated customer organization. All media entities and
//! non-platform users are scoped to exactly one tenant; the tenant id is
//! the unit of data partitioning across the whole system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the human-facing tenant code.
pub const TENANT_CODE_LEN: usize = 8;

/// An isolated customer organization.
///
/// The `id` is permanent and non-guessable. The `code` is the human-facing
/// join credential used once during signup; it can be rotated at any time
/// but must remain globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Rotatable join code (uppercase alphanumeric, fixed length).
    pub code: String,
    /// Human-readable organization name.
    pub name: String,
    /// Soft activation flag. Deactivation blocks new credential issuance
    /// and sign-ups but does not retract already-issued access tokens.
    pub is_active: bool,
    /// Storage key of the organization logo, if uploaded.
    pub logo_path: Option<String>,
    /// Storage key of the login-page cover image, if uploaded.
    pub cover_image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub code: String,
    pub name: String,
}

/// Fields that can be updated on an existing tenant.
///
/// The id and code are deliberately absent: the id never changes and code
/// rotation goes through a dedicated operation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub logo_path: Option<Option<String>>,
    pub cover_image_path: Option<Option<String>>,
}

/// Normalize a tenant code for lookup: trim whitespace, uppercase.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Whether a (normalized) code has the expected shape.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == TENANT_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_code("  abc12xyz "), "ABC12XYZ");
        assert_eq!(normalize_code("ABC12XYZ"), "ABC12XYZ");
    }

    #[test]
    fn code_shape() {
        assert!(is_valid_code("ABC12XYZ"));
        assert!(!is_valid_code("abc12xyz"));
        assert!(!is_valid_code("SHORT"));
        assert!(!is_valid_code("ABC12XY!"));
        assert!(!is_valid_code("TOOLONGCODE1"));
    }
}

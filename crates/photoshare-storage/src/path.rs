//! Tenant-namespaced key derivation and filename sanitization.
//!
//! Keys have the form `tenants/{tenant_id}/{category}/{uuid}_{filename}`.
//! The tenant-id segment is the first of the two ownership signals; the
//! random UUID infix prevents both collisions and key guessing.

use uuid::Uuid;

use crate::error::StorageError;

/// Top-level namespace for all tenant-owned objects.
pub const KEY_PREFIX: &str = "tenants";

/// Key prefix owned by a tenant, with trailing separator.
pub fn tenant_prefix(tenant_id: Uuid) -> String {
    format!("{KEY_PREFIX}/{tenant_id}/")
}

/// Whether `key` falls under the tenant's namespace. This is only the
/// first ownership signal; callers must also verify the object's stored
/// metadata.
pub fn key_matches_tenant(key: &str, tenant_id: Uuid) -> bool {
    key.starts_with(&tenant_prefix(tenant_id))
}

/// Sanitize an uploaded filename: keep only the final path component,
/// replace whitespace with underscores, and drop control characters.
/// Traversal sequences are rejected outright rather than rewritten.
pub fn sanitize_filename(raw: &str) -> Result<String, StorageError> {
    if raw.contains("..") {
        return Err(StorageError::InvalidPath(
            "filename contains traversal sequence".into(),
        ));
    }

    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let clean: String = base
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    if clean.is_empty() {
        return Err(StorageError::InvalidPath("empty filename".into()));
    }

    Ok(clean)
}

/// Validate a category segment (`photos`, `branding`, ...).
fn validate_category(category: &str) -> Result<(), StorageError> {
    let ok = !category.is_empty()
        && category
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !ok {
        return Err(StorageError::InvalidPath(format!(
            "invalid category: {category}"
        )));
    }
    Ok(())
}

/// Derive a fresh tenant-scoped object key.
pub fn derive_key(
    tenant_id: Uuid,
    category: &str,
    filename: &str,
) -> Result<String, StorageError> {
    validate_category(category)?;
    let clean = sanitize_filename(filename)?;
    let unique = Uuid::new_v4();
    Ok(format!(
        "{KEY_PREFIX}/{tenant_id}/{category}/{unique}_{clean}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_key_is_tenant_prefixed() {
        let tenant = Uuid::new_v4();
        let key = derive_key(tenant, "photos", "sunday service.jpg").unwrap();
        assert!(key_matches_tenant(&key, tenant));
        assert!(key.ends_with("_sunday_service.jpg"));
    }

    #[test]
    fn derived_keys_are_unique() {
        let tenant = Uuid::new_v4();
        let a = derive_key(tenant, "photos", "x.jpg").unwrap();
        let b = derive_key(tenant, "photos", "x.jpg").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(
            sanitize_filename("/etc/passwd").unwrap(),
            "passwd".to_string()
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\x\\pic.png").unwrap(),
            "pic.png".to_string()
        );
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_filename("../../secret.jpg").is_err());
        assert!(sanitize_filename("a/../b.jpg").is_err());
    }

    #[test]
    fn sanitize_rejects_empty() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("dir/").is_err());
    }

    #[test]
    fn foreign_prefix_does_not_match() {
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let key = derive_key(other, "photos", "x.jpg").unwrap();
        assert!(!key_matches_tenant(&key, tenant));
    }

    #[test]
    fn bad_category_rejected() {
        let tenant = Uuid::new_v4();
        assert!(derive_key(tenant, "Pho tos", "x.jpg").is_err());
        assert!(derive_key(tenant, "", "x.jpg").is_err());
        assert!(derive_key(tenant, "a/b", "x.jpg").is_err());
    }
}

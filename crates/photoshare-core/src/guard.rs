//! Isolation enforcement gate.
//!
//! A per-request sequence of checks applied to every tenant-scoped
//! operation. Each check is an explicit `Result`-returning function so no
//! deny path can be skipped by an unhandled exception, and the platform
//! bypass rejection is evaluated independently of the other checks rather
//! than derived from the same role flag.

use serde_json::Value;
use tracing::{error, warn};

use crate::context::TenantContext;
use crate::error::{CoreError, CoreResult};
use crate::models::tenant::Tenant;
use crate::models::user::{Role, User};
use crate::scoped::{TenantScopedRecord, Unverified};

/// Full gate for tenant-scoped operations: authenticated principal,
/// bypass rejection, context present, tenant active, principal membership.
/// Returns the verified tenant for use in query scoping.
pub fn tenant_gate<'a>(principal: &User, ctx: &'a TenantContext) -> CoreResult<&'a Tenant> {
    require_active_principal(principal)?;
    deny_platform_bypass(principal, ctx)?;
    let tenant = require_tenant_context(principal, ctx)?;
    require_tenant_active(tenant)?;
    require_membership(principal, tenant)?;
    Ok(tenant)
}

/// Check 1: the principal must be an active account.
pub fn require_active_principal(principal: &User) -> CoreResult<()> {
    if !principal.is_active {
        return Err(CoreError::AuthenticationFailed {
            reason: "account is inactive".into(),
        });
    }
    Ok(())
}

/// Check 2: a tenant context must have been resolved and attached.
///
/// Absence here means the resolution middleware did not run — a wiring
/// defect, not a client mistake — so it is logged as a configuration
/// integrity error before the deny.
pub fn require_tenant_context<'a>(
    principal: &User,
    ctx: &'a TenantContext,
) -> CoreResult<&'a Tenant> {
    match ctx.tenant() {
        Some(tenant) => Ok(tenant),
        None => {
            error!(
                target: "security",
                actor = %principal.id,
                email = %principal.email,
                "tenant-scoped operation reached without tenant context; \
                 resolution middleware missing or misconfigured"
            );
            Err(CoreError::TenantContextMissing)
        }
    }
}

/// Check 3: the resolved tenant must be active.
pub fn require_tenant_active(tenant: &Tenant) -> CoreResult<()> {
    if !tenant.is_active {
        return Err(CoreError::TenantInactive);
    }
    Ok(())
}

/// The principal must actually belong to the context tenant. The context
/// is derived from token claims, so a mismatch means claims and current
/// user state have diverged (e.g. a privileged reassignment mid-session).
pub fn require_membership(principal: &User, tenant: &Tenant) -> CoreResult<()> {
    if principal.tenant_id != Some(tenant.id) {
        warn!(
            target: "security",
            actor = %principal.id,
            context_tenant = %tenant.id,
            actor_tenant = ?principal.tenant_id,
            "principal does not belong to the resolved tenant context"
        );
        return Err(CoreError::PermissionDenied {
            reason: "principal is not a member of this tenant".into(),
        });
    }
    Ok(())
}

/// Check 5: elevated platform privilege is never a substitute for tenant
/// context. Evaluated on its own so that a bug granting a superadmin a
/// synthetic tenant context elsewhere still cannot open tenant data.
pub fn deny_platform_bypass(principal: &User, _ctx: &TenantContext) -> CoreResult<()> {
    if principal.role == Role::SuperAdmin {
        warn!(
            target: "security",
            actor = %principal.id,
            email = %principal.email,
            "platform principal denied access to tenant-scoped operation"
        );
        return Err(CoreError::PermissionDenied {
            reason: "platform accounts cannot access tenant data".into(),
        });
    }
    Ok(())
}

/// Check 4: object-level ownership verification.
///
/// Unseals a record fetched by primary key. On a tenant mismatch the
/// attempt is logged as a security event and the caller receives
/// `CrossTenantDenied`, which the HTTP layer surfaces as a plain
/// not-found so object existence is never confirmed across tenants.
pub fn verify_object<T: TenantScopedRecord>(
    principal: &User,
    tenant: &Tenant,
    record: Unverified<T>,
) -> CoreResult<T> {
    let owner = record.owner();
    if owner != tenant.id {
        let inner = record.0;
        warn!(
            target: "security",
            actor = %principal.id,
            actor_tenant = %tenant.id,
            object_tenant = %owner,
            entity = T::TABLE,
            object_id = %inner.record_id(),
            "cross-tenant access attempt"
        );
        return Err(CoreError::CrossTenantDenied {
            entity: T::TABLE.into(),
            id: inner.record_id().to_string(),
        });
    }
    Ok(record.0)
}

/// Gate for platform-exempt operations (tenant administration console).
/// These run without tenant scoping and are restricted to superadmins.
pub fn platform_gate(principal: &User) -> CoreResult<()> {
    require_active_principal(principal)?;
    if principal.role != Role::SuperAdmin {
        warn!(
            target: "security",
            actor = %principal.id,
            role = principal.role.as_str(),
            "non-platform principal denied platform operation"
        );
        return Err(CoreError::PermissionDenied {
            reason: "platform privileges required".into(),
        });
    }
    Ok(())
}

/// Require the tenant-admin role on top of the tenant gate.
pub fn require_tenant_admin(principal: &User) -> CoreResult<()> {
    if !principal.is_tenant_admin() {
        return Err(CoreError::PermissionDenied {
            reason: "tenant admin role required".into(),
        });
    }
    Ok(())
}

/// Strip a client-supplied tenant identifier from an update payload.
///
/// Tenant reassignment attempts are logged as security warnings but the
/// rest of the update proceeds — a reassignment key must not become a
/// denial-of-service lever against otherwise valid edits.
pub fn scrub_tenant_field(payload: &mut Value, principal: &User, entity: &str) -> bool {
    let Some(map) = payload.as_object_mut() else {
        return false;
    };
    let mut stripped = false;
    for key in ["tenant_id", "tenant"] {
        if map.remove(key).is_some() {
            stripped = true;
        }
    }
    if stripped {
        warn!(
            target: "security",
            actor = %principal.id,
            entity,
            "update payload attempted tenant reassignment; field stripped"
        );
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn tenant(active: bool) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            code: "ABC12XYZ".into(),
            name: "First Church".into(),
            is_active: active,
            logo_path: None,
            cover_image_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn member_of(tenant: &Tenant) -> User {
        User {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: "A".into(),
            password_hash: String::new(),
            tenant_id: Some(tenant.id),
            role: Role::Member,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn superadmin() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ops@example.com".into(),
            first_name: "Ops".into(),
            last_name: "O".into(),
            password_hash: String::new(),
            tenant_id: None,
            role: Role::SuperAdmin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn gate_passes_active_member() {
        let t = tenant(true);
        let user = member_of(&t);
        let ctx = TenantContext::for_tenant(t.clone());
        let verified = tenant_gate(&user, &ctx).unwrap();
        assert_eq!(verified.id, t.id);
    }

    #[test]
    fn gate_denies_missing_context() {
        let t = tenant(true);
        let user = member_of(&t);
        let ctx = TenantContext::platform();
        assert!(matches!(
            tenant_gate(&user, &ctx),
            Err(CoreError::TenantContextMissing)
        ));
    }

    #[test]
    fn gate_denies_inactive_tenant() {
        let t = tenant(false);
        let user = member_of(&t);
        let ctx = TenantContext::for_tenant(t);
        assert!(matches!(
            tenant_gate(&user, &ctx),
            Err(CoreError::TenantInactive)
        ));
    }

    #[test]
    fn gate_denies_inactive_principal() {
        let t = tenant(true);
        let mut user = member_of(&t);
        user.is_active = false;
        let ctx = TenantContext::for_tenant(t);
        assert!(matches!(
            tenant_gate(&user, &ctx),
            Err(CoreError::AuthenticationFailed { .. })
        ));
    }

    #[test]
    fn superadmin_never_passes_tenant_gate() {
        // Even with a synthetic tenant context, the independent bypass
        // rejection denies platform principals.
        let t = tenant(true);
        let user = superadmin();
        let ctx = TenantContext::for_tenant(t);
        assert!(matches!(
            tenant_gate(&user, &ctx),
            Err(CoreError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn membership_mismatch_denied() {
        let t = tenant(true);
        let other = tenant(true);
        let user = member_of(&other);
        let ctx = TenantContext::for_tenant(t);
        assert!(matches!(
            tenant_gate(&user, &ctx),
            Err(CoreError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn verify_object_cross_tenant_is_not_found_shaped() {
        use crate::models::album::Album;

        let t = tenant(true);
        let user = member_of(&t);
        let foreign = Album {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            title: "Easter 2026".into(),
            description: String::new(),
            created_by: Uuid::new_v4(),
            is_public: false,
            is_featured: false,
            event_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let err = verify_object(&user, &t, Unverified::new(foreign)).unwrap_err();
        assert!(matches!(err, CoreError::CrossTenantDenied { .. }));
    }

    #[test]
    fn verify_object_same_tenant_unseals() {
        use crate::models::album::Album;

        let t = tenant(true);
        let user = member_of(&t);
        let album = Album {
            id: Uuid::new_v4(),
            tenant_id: t.id,
            title: "Picnic".into(),
            description: String::new(),
            created_by: user.id,
            is_public: true,
            is_featured: false,
            event_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let unsealed = verify_object(&user, &t, Unverified::new(album)).unwrap();
        assert_eq!(unsealed.tenant_id, t.id);
    }

    #[test]
    fn platform_gate_denies_tenant_roles() {
        let t = tenant(true);
        let user = member_of(&t);
        assert!(platform_gate(&user).is_err());
        assert!(platform_gate(&superadmin()).is_ok());
    }

    #[test]
    fn scrub_removes_tenant_keys_and_keeps_rest() {
        let t = tenant(true);
        let user = member_of(&t);
        let mut payload = json!({
            "title": "New title",
            "tenant_id": Uuid::new_v4().to_string(),
        });
        assert!(scrub_tenant_field(&mut payload, &user, "album"));
        assert!(payload.get("tenant_id").is_none());
        assert_eq!(payload.get("title").unwrap(), "New title");

        let mut clean = json!({ "title": "x" });
        assert!(!scrub_tenant_field(&mut clean, &user, "album"));
    }
}

//! Tenant context resolution.
//!
//! Every authenticated request gets exactly one [`TenantContext`] attached
//! before any tenant-scoped operation runs. Resolution fails closed: a
//! token that names a tenant which cannot be loaded is rejected, never
//! silently treated as a platform context.

use tracing::warn;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::tenant::Tenant;
use crate::repository::TenantRepository;

/// The request-scoped binding of a principal to a tenant (or to "no
/// tenant" for platform operators).
#[derive(Debug, Clone)]
pub struct TenantContext {
    tenant: Option<Tenant>,
}

impl TenantContext {
    /// Context for a platform principal with no tenant binding.
    pub fn platform() -> Self {
        Self { tenant: None }
    }

    /// Context bound to a loaded tenant. The tenant may be inactive; the
    /// enforcement gate decides what that means per operation.
    pub fn for_tenant(tenant: Tenant) -> Self {
        Self {
            tenant: Some(tenant),
        }
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        self.tenant.as_ref()
    }

    pub fn is_platform(&self) -> bool {
        self.tenant.is_none()
    }
}

/// Resolve the tenant context for a validated token claim.
///
/// - No tenant claim → platform context. Only operations explicitly
///   declared platform-exempt may proceed under it.
/// - Tenant claim present but the tenant cannot be found → `InvalidTenant`
///   (fail closed).
/// - Tenant found but inactive → the context still resolves, carrying the
///   inactive tenant; the gate denies everything except activation paths.
pub async fn resolve_tenant_context<R: TenantRepository>(
    claimed_tenant: Option<Uuid>,
    tenants: &R,
) -> CoreResult<TenantContext> {
    let Some(tenant_id) = claimed_tenant else {
        return Ok(TenantContext::platform());
    };

    match tenants.get_by_id(tenant_id).await {
        Ok(tenant) => Ok(TenantContext::for_tenant(tenant)),
        Err(CoreError::NotFound { .. }) => {
            warn!(
                target: "security",
                tenant_id = %tenant_id,
                "token references a tenant that does not exist"
            );
            Err(CoreError::InvalidTenant)
        }
        Err(other) => Err(other),
    }
}

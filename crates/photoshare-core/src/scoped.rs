//! Capability traits for tenant-scoped entities.
//!
//! A type can only participate in tenant-scoped persistence if it
//! implements [`TenantScopedRecord`]. The trait bound replaces runtime
//! attribute sniffing: a collection type without a tenant identifier does
//! not compile into a scoped query, so the structural guarantee holds at
//! build time rather than at call time.

use uuid::Uuid;

/// An entity that carries an immutable owning-tenant identifier.
pub trait TenantOwned {
    fn tenant_id(&self) -> Uuid;
}

/// A [`TenantOwned`] record stored in a tenant-scoped collection.
///
/// `TABLE` names the backing collection; every scoped query in the
/// database layer is constructed from this constant together with a
/// mandatory tenant-id filter parameter.
pub trait TenantScopedRecord: TenantOwned {
    const TABLE: &'static str;

    fn record_id(&self) -> Uuid;
}

/// A tenant-owned record loaded without a tenant filter.
///
/// Object-level reads fetch by primary key and must then prove ownership
/// against the request context. The inner value is private and there is
/// no accessor on this type: the only way to get the record out is
/// [`crate::guard::verify_object`], which performs the ownership check
/// and logs violations. A handler cannot forget the check without failing
/// to compile.
#[derive(Debug)]
pub struct Unverified<T: TenantOwned>(pub(crate) T);

impl<T: TenantOwned> Unverified<T> {
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// The owning tenant of the wrapped record. Exposed so callers can
    /// log or audit a mismatch; the record itself stays sealed.
    pub fn owner(&self) -> Uuid {
        self.0.tenant_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget {
        tenant: Uuid,
    }

    impl TenantOwned for Widget {
        fn tenant_id(&self) -> Uuid {
            self.tenant
        }
    }

    #[test]
    fn unverified_exposes_owner_only() {
        let tenant = Uuid::new_v4();
        let wrapped = Unverified::new(Widget { tenant });
        assert_eq!(wrapped.owner(), tenant);
    }
}

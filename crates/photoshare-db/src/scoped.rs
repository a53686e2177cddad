//! Scoped query construction for tenant-scoped collections.
//!
//! Every list, mutation, and count against a tenant-scoped table is built
//! through these helpers, which are generic over
//! [`TenantScopedRecord`]. A type without a tenant identifier cannot
//! satisfy the bound, so an unscoped query against a tenant-scoped
//! collection is unrepresentable — the structural guarantee is enforced
//! when the repository is written, not when a request arrives. The
//! `$tenant_id` bind parameter is part of every generated statement.

use photoshare_core::scoped::TenantScopedRecord;

/// `SELECT` over the tenant's slice of the collection, newest first.
pub(crate) fn select_scoped<T: TenantScopedRecord>(extra_filter: Option<&str>) -> String {
    let extra = extra_filter.map(|f| format!(" AND {f}")).unwrap_or_default();
    format!(
        "SELECT meta::id(id) AS record_id, * FROM {} \
         WHERE tenant_id = $tenant_id{extra} \
         ORDER BY created_at DESC \
         LIMIT $limit START $offset",
        T::TABLE
    )
}

/// Count of the tenant's slice of the collection.
pub(crate) fn count_scoped<T: TenantScopedRecord>(extra_filter: Option<&str>) -> String {
    let extra = extra_filter.map(|f| format!(" AND {f}")).unwrap_or_default();
    format!(
        "SELECT count() AS total FROM {} \
         WHERE tenant_id = $tenant_id{extra} GROUP ALL",
        T::TABLE
    )
}

/// Scoped update by record id. `sets` is the comma-joined SET list; the
/// tenant filter rides on every mutation as defense in depth on top of
/// the object-level ownership check.
pub(crate) fn update_scoped<T: TenantScopedRecord>(sets: &str) -> String {
    format!(
        "UPDATE type::record('{}', $id) SET {sets} \
         WHERE tenant_id = $tenant_id \
         RETURN meta::id(id) AS record_id, *",
        T::TABLE
    )
}

/// Scoped delete by record id.
pub(crate) fn delete_scoped<T: TenantScopedRecord>() -> String {
    format!(
        "DELETE type::record('{}', $id) WHERE tenant_id = $tenant_id",
        T::TABLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use photoshare_core::models::album::Album;
    use photoshare_core::models::photo::Photo;

    #[test]
    fn every_generated_query_carries_the_tenant_filter() {
        for query in [
            select_scoped::<Album>(None),
            select_scoped::<Photo>(Some("album_id = $album_id")),
            count_scoped::<Album>(None),
            update_scoped::<Photo>("title = $title"),
            delete_scoped::<Album>(),
        ] {
            assert!(
                query.contains("tenant_id = $tenant_id"),
                "missing tenant filter in: {query}"
            );
        }
    }

    #[test]
    fn extra_filters_are_appended() {
        let query = select_scoped::<Photo>(Some("album_id = $album_id"));
        assert!(query.contains("AND album_id = $album_id"));
    }
}

//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Every tenant-scoped table carries
//! a mandatory `tenant_id` field and a `(tenant_id, created_at)` index
//! for efficient scoped listing.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD code ON TABLE tenant TYPE string;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD is_active ON TABLE tenant TYPE bool DEFAULT true;
DEFINE FIELD logo_path ON TABLE tenant TYPE option<string>;
DEFINE FIELD cover_image_path ON TABLE tenant TYPE option<string>;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_code ON TABLE tenant COLUMNS code UNIQUE;
DEFINE INDEX idx_tenant_active ON TABLE tenant COLUMNS is_active;

-- =======================================================================
-- Users (global identity, optional tenant binding)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD tenant_id ON TABLE user TYPE option<string>;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['member', 'admin', 'superadmin'];
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_tenant ON TABLE user COLUMNS tenant_id;

-- =======================================================================
-- Refresh sessions (revocation store)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD tenant_id ON TABLE session TYPE option<string>;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD revoked_at ON TABLE session TYPE option<datetime>;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token ON TABLE session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;

-- =======================================================================
-- Albums (tenant scope)
-- =======================================================================
DEFINE TABLE album SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE album TYPE string;
DEFINE FIELD title ON TABLE album TYPE string;
DEFINE FIELD description ON TABLE album TYPE string DEFAULT '';
DEFINE FIELD created_by ON TABLE album TYPE string;
DEFINE FIELD is_public ON TABLE album TYPE bool DEFAULT false;
DEFINE FIELD is_featured ON TABLE album TYPE bool DEFAULT false;
DEFINE FIELD event_date ON TABLE album TYPE option<string>;
DEFINE FIELD created_at ON TABLE album TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE album TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_album_tenant_created ON TABLE album \
    COLUMNS tenant_id, created_at;
DEFINE INDEX idx_album_tenant_title ON TABLE album \
    COLUMNS tenant_id, title UNIQUE;

-- =======================================================================
-- Photos (tenant scope)
-- =======================================================================
DEFINE TABLE photo SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE photo TYPE string;
DEFINE FIELD album_id ON TABLE photo TYPE option<string>;
DEFINE FIELD title ON TABLE photo TYPE string;
DEFINE FIELD description ON TABLE photo TYPE string DEFAULT '';
DEFINE FIELD filename ON TABLE photo TYPE string;
DEFINE FIELD storage_key ON TABLE photo TYPE string;
DEFINE FIELD file_size ON TABLE photo TYPE int;
DEFINE FIELD content_type ON TABLE photo TYPE string \
    DEFAULT 'image/jpeg';
DEFINE FIELD uploaded_by ON TABLE photo TYPE string;
DEFINE FIELD is_public ON TABLE photo TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE photo TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE photo TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_photo_tenant_created ON TABLE photo \
    COLUMNS tenant_id, created_at;
DEFINE INDEX idx_photo_tenant_album ON TABLE photo \
    COLUMNS tenant_id, album_id;

-- =======================================================================
-- Audit Log (append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD tenant_id ON TABLE audit_log TYPE option<string>;
DEFINE FIELD actor_id ON TABLE audit_log TYPE option<string>;
DEFINE FIELD action ON TABLE audit_log TYPE string;
DEFINE FIELD resource ON TABLE audit_log TYPE option<string>;
DEFINE FIELD outcome ON TABLE audit_log TYPE string \
    ASSERT $value IN ['Success', 'Denied'];
DEFINE FIELD ip_address ON TABLE audit_log TYPE option<string>;
DEFINE FIELD detail ON TABLE audit_log TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD timestamp ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_tenant_time ON TABLE audit_log \
    COLUMNS tenant_id, timestamp;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn every_tenant_scoped_table_defines_tenant_id() {
        for table in ["album", "photo"] {
            let ddl = format!("DEFINE FIELD tenant_id ON TABLE {table}");
            assert!(SCHEMA_V1.contains(&ddl), "{table} must carry tenant_id");
        }
    }
}

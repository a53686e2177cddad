//! SurrealDB implementation of [`AuditLogRepository`].

use chrono::{DateTime, Utc};
use photoshare_core::error::CoreResult;
use photoshare_core::models::audit::{AuditLogEntry, AuditOutcome, CreateAuditLogEntry};
use photoshare_core::repository::{AuditLogRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AuditRow {
    tenant_id: Option<String>,
    actor_id: Option<String>,
    action: String,
    resource: Option<String>,
    outcome: String,
    ip_address: Option<String>,
    detail: serde_json::Value,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AuditRowWithId {
    record_id: String,
    tenant_id: Option<String>,
    actor_id: Option<String>,
    action: String,
    resource: Option<String>,
    outcome: String,
    ip_address: Option<String>,
    detail: serde_json::Value,
    timestamp: DateTime<Utc>,
}

fn parse_outcome(s: &str) -> Result<AuditOutcome, DbError> {
    match s {
        "Success" => Ok(AuditOutcome::Success),
        "Denied" => Ok(AuditOutcome::Denied),
        other => Err(DbError::Migration(format!("unknown audit outcome: {other}"))),
    }
}

fn outcome_to_string(o: &AuditOutcome) -> &'static str {
    match o {
        AuditOutcome::Success => "Success",
        AuditOutcome::Denied => "Denied",
    }
}

fn parse_optional_uuid(raw: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    raw.map(|s| {
        Uuid::parse_str(&s).map_err(|e| DbError::Migration(format!("invalid {what} UUID: {e}")))
    })
    .transpose()
}

impl AuditRow {
    fn into_entry(self, id: Uuid) -> Result<AuditLogEntry, DbError> {
        Ok(AuditLogEntry {
            id,
            tenant_id: parse_optional_uuid(self.tenant_id, "tenant")?,
            actor_id: parse_optional_uuid(self.actor_id, "actor")?,
            action: self.action,
            resource: self.resource,
            outcome: parse_outcome(&self.outcome)?,
            ip_address: self.ip_address,
            detail: self.detail,
            timestamp: self.timestamp,
        })
    }
}

impl AuditRowWithId {
    fn try_into_entry(self) -> Result<AuditLogEntry, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let row = AuditRow {
            tenant_id: self.tenant_id,
            actor_id: self.actor_id,
            action: self.action,
            resource: self.resource,
            outcome: self.outcome,
            ip_address: self.ip_address,
            detail: self.detail,
            timestamp: self.timestamp,
        };
        row.into_entry(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the audit log repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditLogEntry) -> CoreResult<AuditLogEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 tenant_id = $tenant_id, \
                 actor_id = $actor_id, \
                 action = $action, \
                 resource = $resource, \
                 outcome = $outcome, \
                 ip_address = $ip_address, \
                 detail = $detail",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.map(|t| t.to_string())))
            .bind(("actor_id", input.actor_id.map(|a| a.to_string())))
            .bind(("action", input.action))
            .bind(("resource", input.resource))
            .bind(("outcome", outcome_to_string(&input.outcome).to_string()))
            .bind(("ip_address", input.ip_address))
            .bind(("detail", input.detail))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row.into_entry(id)?)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> CoreResult<PaginatedResult<AuditLogEntry>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM audit_log \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM audit_log \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY timestamp DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

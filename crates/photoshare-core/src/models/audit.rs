//! Security audit log domain model.
//!
//! Append-only. Denied cross-tenant and bypass attempts are recorded here
//! with full actor/object identifiers; the client only ever sees the
//! generic error shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// Tenant the actor was resolved to, if any.
    pub tenant_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    /// Machine-readable action, e.g. `photo.read`, `tenant.assign`.
    pub action: String,
    /// Identifier of the object involved, if any.
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    pub detail: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    pub tenant_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    pub detail: serde_json::Value,
}

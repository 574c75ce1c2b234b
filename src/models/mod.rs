//! Domain record types supplied by the upstream backend.
//!
//! These are the raw row shapes the metrics engine aggregates. They are
//! deserialized straight from the backend's REST responses; the analytics
//! core never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operating state of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentState {
    Operational,
    UnderMaintenance,
    Stopped,
}

/// A piece of managed equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    /// Equipment ID
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Equipment category (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Physical location (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Current operating state as recorded on the equipment row
    pub state: EquipmentState,

    /// When the state last changed (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_at: Option<DateTime<Utc>>,

    /// Row creation time
    pub created_at: DateTime<Utc>,

    /// Last row update time (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A point-in-time state change event for one piece of equipment.
///
/// Status records can be newer than the denormalized `state` on the
/// equipment row, so aggregations prefer the latest status record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Record ID
    pub id: String,

    /// Equipment this status belongs to
    pub equipment_id: String,

    /// State the equipment entered
    pub state: EquipmentState,

    /// When the state change happened
    pub occurred_at: DateTime<Utc>,
}

/// Triage state of a breakdown report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownStatus {
    Reported,
    InProgress,
    Resolved,
}

/// Reported severity of a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Urgent,
}

/// A reported equipment failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownReport {
    /// Report ID
    pub id: String,

    /// Equipment that failed
    pub equipment_id: String,

    /// Current triage state
    pub status: BreakdownStatus,

    /// Reported severity
    pub severity: Severity,

    /// When the failure occurred
    pub occurred_at: DateTime<Utc>,

    /// When the breakdown was resolved (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Row creation time
    pub created_at: DateTime<Utc>,
}

/// Progress state of a repair job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Scheduled,
    InProgress,
    Completed,
}

/// Whether a repair was planned ahead or a reaction to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    Preventive,
    Corrective,
}

/// A repair job, optionally linked to the breakdown it addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairReport {
    /// Report ID
    pub id: String,

    /// Equipment being repaired
    pub equipment_id: String,

    /// Breakdown this repair addresses (optional for preventive work)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown_id: Option<String>,

    /// Progress state
    pub status: RepairStatus,

    /// Preventive or corrective
    pub kind: RepairKind,

    /// When work started (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When work finished (optional, set when `status` is `Completed`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl RepairReport {
    /// The timestamp a repair is bucketed by for trend charts: completion
    /// time when finished, otherwise work start, otherwise creation.
    pub fn occurrence(&self) -> DateTime<Utc> {
        self.completed_at
            .or(self.started_at)
            .unwrap_or(self.created_at)
    }
}

/// State of a scheduled maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Planned,
    Completed,
    Missed,
}

/// A scheduled maintenance task for one piece of equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceTask {
    /// Task ID
    pub id: String,

    /// Equipment the task applies to
    pub equipment_id: String,

    /// Task state
    pub status: MaintenanceStatus,

    /// When the task is due
    pub due_at: DateTime<Utc>,

    /// When the task was completed (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl MaintenanceTask {
    /// Whether the task was completed on or before its due time.
    pub fn completed_on_time(&self) -> bool {
        matches!(self.status, MaintenanceStatus::Completed)
            && self.completed_at.is_some_and(|done| done <= self.due_at)
    }
}

/// One consistent snapshot of every record set, fetched in a single
/// upstream round trip so all derived reports agree with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub equipment: Vec<Equipment>,
    pub statuses: Vec<StatusRecord>,
    pub breakdowns: Vec<BreakdownReport>,
    pub repairs: Vec<RepairReport>,
    pub maintenance: Vec<MaintenanceTask>,

    /// When this snapshot was assembled
    pub fetched_at: DateTime<Utc>,
}

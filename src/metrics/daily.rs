//! Point-in-time counts of breakdowns, repairs, and equipment by state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    BreakdownReport, BreakdownStatus, Equipment, RepairReport, RepairStatus, Severity,
    StatusRecord,
};

/// Counts for one day window of records.
///
/// The function aggregates whatever records it is given; callers pre-filter
/// by date window when a daily view is wanted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub breakdowns: BreakdownCounts,
    pub repairs: RepairCounts,
    pub equipment: EquipmentCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownCounts {
    /// Not yet resolved
    pub active: usize,
    /// Active and reported at urgent severity
    pub urgent: usize,
    /// Reported but not yet picked up
    pub pending: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairCounts {
    pub completed: usize,
    pub in_progress: usize,
    pub scheduled: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentCounts {
    pub operational: usize,
    pub under_maintenance: usize,
    pub stopped: usize,
}

/// Aggregate the given records into state counts.
///
/// Equipment is counted by its latest status record when one exists, since
/// status events can be newer than the denormalized state on the equipment
/// row; equipment with no status record falls back to the row state.
pub fn calculate_daily_stats(
    breakdowns: &[BreakdownReport],
    repairs: &[RepairReport],
    equipment: &[Equipment],
    statuses: &[StatusRecord],
) -> DailyStats {
    let mut breakdown_counts = BreakdownCounts::default();
    for report in breakdowns {
        if report.status != BreakdownStatus::Resolved {
            breakdown_counts.active += 1;
            if report.severity == Severity::Urgent {
                breakdown_counts.urgent += 1;
            }
        }
        if report.status == BreakdownStatus::Reported {
            breakdown_counts.pending += 1;
        }
    }

    let mut repair_counts = RepairCounts::default();
    for repair in repairs {
        match repair.status {
            RepairStatus::Completed => repair_counts.completed += 1,
            RepairStatus::InProgress => repair_counts.in_progress += 1,
            RepairStatus::Scheduled => repair_counts.scheduled += 1,
        }
    }

    // Latest status event per equipment
    let mut latest: HashMap<&str, &StatusRecord> = HashMap::new();
    for status in statuses {
        latest
            .entry(status.equipment_id.as_str())
            .and_modify(|current| {
                if status.occurred_at > current.occurred_at {
                    *current = status;
                }
            })
            .or_insert(status);
    }

    let mut equipment_counts = EquipmentCounts::default();
    for item in equipment {
        let state = latest
            .get(item.id.as_str())
            .map(|s| s.state)
            .unwrap_or(item.state);
        match state {
            crate::models::EquipmentState::Operational => equipment_counts.operational += 1,
            crate::models::EquipmentState::UnderMaintenance => {
                equipment_counts.under_maintenance += 1
            }
            crate::models::EquipmentState::Stopped => equipment_counts.stopped += 1,
        }
    }

    DailyStats {
        breakdowns: breakdown_counts,
        repairs: repair_counts,
        equipment: equipment_counts,
    }
}

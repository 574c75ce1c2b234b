//! Per-equipment health score and letter grade.
//!
//! The weighting is fixed and documented here so the score is reproducible:
//! starting from 100 points,
//!
//! * each breakdown in the trailing 30 days costs 10 points (capped at 60),
//! * the mean repair duration over resolved breakdowns costs 0.5 points per
//!   hour (capped at 25),
//! * a current stopped state costs 5 points, under-maintenance costs 2,
//! * each on-time completed maintenance task earns 2 points back (capped
//!   at 10),
//!
//! and the result is clamped to [0, 100]. More breakdowns can never raise
//! the score and more on-time maintenance can never lower it. `now` is an
//! explicit parameter; the function reads no clocks of its own.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BreakdownReport, Equipment, EquipmentState, MaintenanceTask, StatusRecord};

/// Trailing window for breakdown frequency.
const RECENT_WINDOW_DAYS: i64 = 30;

const BREAKDOWN_POINTS: f64 = 10.0;
const BREAKDOWN_PENALTY_CAP: f64 = 60.0;
const REPAIR_POINTS_PER_HOUR: f64 = 0.5;
const REPAIR_PENALTY_CAP: f64 = 25.0;
const MAINTENANCE_POINTS: f64 = 2.0;
const MAINTENANCE_BONUS_CAP: f64 = 10.0;
const STOPPED_PENALTY: f64 = 5.0;
const UNDER_MAINTENANCE_PENALTY: f64 = 2.0;

/// Letter grade banding over the score range.
///
/// Bands partition [0, 100]: A is 90 and above, B is [75, 90), C is
/// [60, 75), D is [40, 60), F is below 40.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 75.0 {
            Grade::B
        } else if score >= 60.0 {
            Grade::C
        } else if score >= 40.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

/// Health score for one piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentScore {
    pub equipment_id: String,
    /// Score in [0, 100]
    pub score: f64,
    pub grade: Grade,
    /// Breakdowns in the trailing 30-day window
    pub recent_breakdowns: usize,
    /// Mean occurred-to-resolved duration over resolved breakdowns, in hours
    pub avg_repair_hours: Option<f64>,
    /// Maintenance tasks completed on or before their due time
    pub on_time_maintenance: usize,
}

/// Score one piece of equipment from its history.
///
/// Rows belonging to other equipment are ignored, so callers may pass
/// unfiltered record sets. Records with a resolution earlier than their
/// occurrence are treated as malformed and excluded from the repair
/// duration average.
pub fn calculate_equipment_score(
    equipment: &Equipment,
    statuses: &[StatusRecord],
    breakdowns: &[BreakdownReport],
    maintenance: &[MaintenanceTask],
    now: DateTime<Utc>,
) -> EquipmentScore {
    let window = Duration::days(RECENT_WINDOW_DAYS);
    let mine = |eq_id: &str| eq_id == equipment.id;

    let recent_breakdowns = breakdowns
        .iter()
        .filter(|b| mine(&b.equipment_id))
        .filter(|b| b.occurred_at <= now && now - b.occurred_at < window)
        .count();
    let breakdown_penalty =
        (BREAKDOWN_POINTS * recent_breakdowns as f64).min(BREAKDOWN_PENALTY_CAP);

    let repair_hours: Vec<f64> = breakdowns
        .iter()
        .filter(|b| mine(&b.equipment_id))
        .filter_map(|b| b.resolved_at.map(|done| done - b.occurred_at))
        .filter(|d| *d >= Duration::zero())
        .map(|d| d.num_seconds() as f64 / 3600.0)
        .collect();
    let avg_repair_hours = if repair_hours.is_empty() {
        None
    } else {
        Some(repair_hours.iter().sum::<f64>() / repair_hours.len() as f64)
    };
    let repair_penalty = avg_repair_hours
        .map(|h| (h * REPAIR_POINTS_PER_HOUR).min(REPAIR_PENALTY_CAP))
        .unwrap_or(0.0);

    let on_time_maintenance = maintenance
        .iter()
        .filter(|m| mine(&m.equipment_id))
        .filter(|m| m.completed_on_time())
        .count();
    let maintenance_bonus =
        (MAINTENANCE_POINTS * on_time_maintenance as f64).min(MAINTENANCE_BONUS_CAP);

    let current_state = statuses
        .iter()
        .filter(|s| mine(&s.equipment_id))
        .max_by_key(|s| s.occurred_at)
        .map(|s| s.state)
        .unwrap_or(equipment.state);
    let state_penalty = match current_state {
        EquipmentState::Operational => 0.0,
        EquipmentState::UnderMaintenance => UNDER_MAINTENANCE_PENALTY,
        EquipmentState::Stopped => STOPPED_PENALTY,
    };

    let score = (100.0 - breakdown_penalty - repair_penalty - state_penalty + maintenance_bonus)
        .clamp(0.0, 100.0);

    EquipmentScore {
        equipment_id: equipment.id.clone(),
        score,
        grade: Grade::from_score(score),
        recent_breakdowns,
        avg_repair_hours,
        on_time_maintenance,
    }
}

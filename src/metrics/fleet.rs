//! Fleet-level reliability metrics: MTBF, MTTR, completion rate.
//!
//! Fleet aggregation is the arithmetic mean across equipment that have
//! enough history; equipment below the threshold (fewer than two
//! breakdowns for MTBF, no completed linked repair for MTTR) are reported
//! individually as `None` rather than defaulting to zero, and excluded
//! from the fleet average. Period deltas compare the trailing 30 days
//! against the 30 days before that.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    BreakdownReport, Equipment, EquipmentState, MaintenanceTask, RepairKind, RepairReport,
    RepairStatus, StatusRecord,
};

/// Width of the trailing comparison periods.
const PERIOD_DAYS: i64 = 30;

/// Reliability figures for one piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentReliability {
    pub equipment_id: String,
    /// Mean hours between consecutive breakdowns; `None` with fewer than
    /// two breakdowns on record (insufficient data)
    pub mtbf_hours: Option<f64>,
    /// Mean hours from failure to repair completion; `None` without a
    /// completed linked repair
    pub mttr_hours: Option<f64>,
    pub breakdowns: usize,
    pub completed_repairs: usize,
}

/// A fleet metric with its trailing-period movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Fleet mean over all history; `None` when no equipment qualifies
    pub value_hours: Option<f64>,
    /// Trailing 30 days minus the 30 days before; `None` when either
    /// window lacks data
    pub change_hours: Option<f64>,
    /// Equipment with the most favorable individual value; ties broken by
    /// equipment id ascending
    pub best_equipment: Option<String>,
}

/// Repair throughput figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    /// Completed repairs as a percentage of all repairs
    pub rate_percent: f64,
    /// Trailing-period completion rate movement; `None` when either
    /// window has no repairs
    pub change_percent: Option<f64>,
    /// Preventive share of all repairs
    pub preventive_percent: f64,
    /// Completed maintenance tasks as a percentage of all tasks
    pub maintenance_completion_percent: f64,
}

/// Fleet-level derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetMetrics {
    pub mtbf: MetricSummary,
    pub mttr: MetricSummary,
    pub completion: CompletionSummary,
    /// Share of the fleet currently operational
    pub operational_percent: f64,
    /// Per-equipment figures, ordered by equipment id
    pub equipment: Vec<EquipmentReliability>,
}

/// Compute fleet reliability metrics from a record snapshot.
///
/// Pure and deterministic for fixed inputs and a fixed `now`; empty record
/// sets produce zero-valued summaries rather than errors. Breakdowns
/// referencing equipment absent from `equipment` are ignored.
pub fn generate_comprehensive_metrics(
    equipment: &[Equipment],
    statuses: &[StatusRecord],
    breakdowns: &[BreakdownReport],
    repairs: &[RepairReport],
    maintenance: &[MaintenanceTask],
    now: DateTime<Utc>,
) -> FleetMetrics {
    // Completion time of the repair resolving each breakdown
    let repair_done: HashMap<&str, DateTime<Utc>> = repairs
        .iter()
        .filter(|r| r.status == RepairStatus::Completed)
        .filter_map(|r| {
            let breakdown_id = r.breakdown_id.as_deref()?;
            Some((breakdown_id, r.completed_at?))
        })
        .collect();

    // BTreeMap keeps per-equipment iteration ordered by id, which both
    // makes the output deterministic and gives the id-ascending tie-break
    // for "best equipment" for free.
    let mut per_equipment: BTreeMap<&str, Vec<&BreakdownReport>> = equipment
        .iter()
        .map(|e| (e.id.as_str(), Vec::new()))
        .collect();
    for report in breakdowns {
        if let Some(list) = per_equipment.get_mut(report.equipment_id.as_str()) {
            list.push(report);
        }
    }

    let mut rows = Vec::with_capacity(per_equipment.len());
    for (id, mut reports) in per_equipment {
        reports.sort_by_key(|b| b.occurred_at);
        let times: Vec<DateTime<Utc>> = reports.iter().map(|b| b.occurred_at).collect();
        let durations = mttr_durations(&reports, &repair_done);
        rows.push(EquipmentReliability {
            equipment_id: id.to_string(),
            mtbf_hours: mtbf_of(&times),
            mttr_hours: mean(&durations),
            breakdowns: reports.len(),
            completed_repairs: durations.len(),
        });
    }

    let current_start = now - Duration::days(PERIOD_DAYS);
    let previous_start = current_start - Duration::days(PERIOD_DAYS);

    let mtbf = MetricSummary {
        value_hours: fleet_mtbf(breakdowns, equipment, None),
        change_hours: delta(
            fleet_mtbf(breakdowns, equipment, Some((current_start, now))),
            fleet_mtbf(breakdowns, equipment, Some((previous_start, current_start))),
        ),
        best_equipment: best_by(&rows, |r| r.mtbf_hours, Favor::Highest),
    };

    let mttr = MetricSummary {
        value_hours: fleet_mttr(breakdowns, equipment, &repair_done, None),
        change_hours: delta(
            fleet_mttr(breakdowns, equipment, &repair_done, Some((current_start, now))),
            fleet_mttr(
                breakdowns,
                equipment,
                &repair_done,
                Some((previous_start, current_start)),
            ),
        ),
        best_equipment: best_by(&rows, |r| r.mttr_hours, Favor::Lowest),
    };

    let completion = CompletionSummary {
        rate_percent: completion_rate(repairs, None).unwrap_or(0.0),
        change_percent: delta(
            completion_rate(repairs, Some((current_start, now))),
            completion_rate(repairs, Some((previous_start, current_start))),
        ),
        preventive_percent: percentage(
            repairs.iter().filter(|r| r.kind == RepairKind::Preventive).count(),
            repairs.len(),
        ),
        maintenance_completion_percent: percentage(
            maintenance.iter().filter(|m| m.completed_at.is_some()).count(),
            maintenance.len(),
        ),
    };

    FleetMetrics {
        mtbf,
        mttr,
        completion,
        operational_percent: operational_share(equipment, statuses),
        equipment: rows,
    }
}

/// Mean hours between consecutive breakdowns, `None` below two events.
fn mtbf_of(sorted_times: &[DateTime<Utc>]) -> Option<f64> {
    if sorted_times.len() < 2 {
        return None;
    }
    let gaps: Vec<f64> = sorted_times
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 3600.0)
        .collect();
    mean(&gaps)
}

/// Failure-to-repair durations in hours for the given breakdowns,
/// excluding malformed pairs where completion precedes occurrence.
fn mttr_durations(
    reports: &[&BreakdownReport],
    repair_done: &HashMap<&str, DateTime<Utc>>,
) -> Vec<f64> {
    reports
        .iter()
        .filter_map(|b| {
            let done = *repair_done.get(b.id.as_str())?;
            let d = done - b.occurred_at;
            (d >= Duration::zero()).then(|| d.num_seconds() as f64 / 3600.0)
        })
        .collect()
}

/// Fleet MTBF: mean across equipment with at least two breakdowns in the
/// (optional) window.
fn fleet_mtbf(
    breakdowns: &[BreakdownReport],
    equipment: &[Equipment],
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Option<f64> {
    let per_equipment: Vec<f64> = equipment
        .iter()
        .filter_map(|e| {
            let mut times: Vec<DateTime<Utc>> = breakdowns
                .iter()
                .filter(|b| b.equipment_id == e.id)
                .filter(|b| in_window(b.occurred_at, window))
                .map(|b| b.occurred_at)
                .collect();
            times.sort();
            mtbf_of(&times)
        })
        .collect();
    mean(&per_equipment)
}

/// Fleet MTTR: mean across equipment with at least one measured repair in
/// the (optional) window, aggregated the same way as MTBF.
fn fleet_mttr(
    breakdowns: &[BreakdownReport],
    equipment: &[Equipment],
    repair_done: &HashMap<&str, DateTime<Utc>>,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Option<f64> {
    let per_equipment: Vec<f64> = equipment
        .iter()
        .filter_map(|e| {
            let reports: Vec<&BreakdownReport> = breakdowns
                .iter()
                .filter(|b| b.equipment_id == e.id)
                .filter(|b| in_window(b.occurred_at, window))
                .collect();
            mean(&mttr_durations(&reports, repair_done))
        })
        .collect();
    mean(&per_equipment)
}

fn completion_rate(
    repairs: &[RepairReport],
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Option<f64> {
    let in_scope: Vec<&RepairReport> = repairs
        .iter()
        .filter(|r| in_window(r.occurrence(), window))
        .collect();
    if in_scope.is_empty() {
        return None;
    }
    let completed = in_scope
        .iter()
        .filter(|r| r.status == RepairStatus::Completed)
        .count();
    Some(percentage(completed, in_scope.len()))
}

fn operational_share(equipment: &[Equipment], statuses: &[StatusRecord]) -> f64 {
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
    let operational = equipment
        .iter()
        .filter(|e| {
            latest
                .get(e.id.as_str())
                .map(|s| s.state)
                .unwrap_or(e.state)
                == EquipmentState::Operational
        })
        .count();
    percentage(operational, equipment.len())
}

enum Favor {
    Highest,
    Lowest,
}

/// Most favorable equipment by a metric; rows are id-ordered, so keeping
/// the first strict winner yields the id-ascending tie-break.
fn best_by(
    rows: &[EquipmentReliability],
    metric: impl Fn(&EquipmentReliability) -> Option<f64>,
    favor: Favor,
) -> Option<String> {
    let mut best: Option<(&EquipmentReliability, f64)> = None;
    for row in rows {
        let Some(value) = metric(row) else { continue };
        let better = match (&best, &favor) {
            (None, _) => true,
            (Some((_, current)), Favor::Highest) => value > *current,
            (Some((_, current)), Favor::Lowest) => value < *current,
        };
        if better {
            best = Some((row, value));
        }
    }
    best.map(|(row, _)| row.equipment_id.clone())
}

fn in_window(at: DateTime<Utc>, window: Option<(DateTime<Utc>, DateTime<Utc>)>) -> bool {
    match window {
        Some((start, end)) => at >= start && at < end,
        None => true,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(current? - previous?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testdata::{
        breakdown, equipment, maintenance, repair, repair_for, resolved_breakdown, ts,
    };
    use crate::models::{BreakdownStatus, MaintenanceStatus, Severity};

    fn now() -> DateTime<Utc> {
        ts("2026-06-01T00:00:00Z")
    }

    #[test]
    fn test_empty_input_yields_insufficient_data() {
        let metrics = generate_comprehensive_metrics(&[], &[], &[], &[], &[], now());
        assert!(metrics.mtbf.value_hours.is_none());
        assert!(metrics.mttr.value_hours.is_none());
        assert!(metrics.mtbf.best_equipment.is_none());
        assert_eq!(metrics.completion.rate_percent, 0.0);
        assert_eq!(metrics.operational_percent, 0.0);
        assert!(metrics.equipment.is_empty());
    }

    #[test]
    fn test_single_breakdown_is_insufficient_for_mtbf_but_counts_for_mttr() {
        // One breakdown ever recorded, with a completed repair
        let fleet = vec![equipment("eq-1", EquipmentState::Operational)];
        let breakdowns = vec![breakdown(
            "b1",
            "eq-1",
            BreakdownStatus::Resolved,
            Severity::High,
            "2026-05-01T00:00:00Z",
        )];
        let repairs = vec![repair_for("r1", "eq-1", "b1", "2026-05-01T06:00:00Z")];

        let metrics =
            generate_comprehensive_metrics(&fleet, &[], &breakdowns, &repairs, &[], now());

        let row = &metrics.equipment[0];
        assert_eq!(row.equipment_id, "eq-1");
        assert!(row.mtbf_hours.is_none(), "one event is insufficient data");
        assert_eq!(row.mttr_hours, Some(6.0));

        assert!(metrics.mtbf.value_hours.is_none());
        assert_eq!(metrics.mttr.value_hours, Some(6.0));
    }

    #[test]
    fn test_mtbf_mean_of_consecutive_gaps() {
        let fleet = vec![equipment("eq-1", EquipmentState::Operational)];
        // Gaps of 48h and 24h -> mean 36h
        let breakdowns = vec![
            breakdown("b1", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-01T00:00:00Z"),
            breakdown("b2", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-03T00:00:00Z"),
            breakdown("b3", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-04T00:00:00Z"),
        ];

        let metrics = generate_comprehensive_metrics(&fleet, &[], &breakdowns, &[], &[], now());
        assert_eq!(metrics.equipment[0].mtbf_hours, Some(36.0));
        assert_eq!(metrics.mtbf.value_hours, Some(36.0));
    }

    #[test]
    fn test_fleet_mtbf_excludes_insufficient_equipment() {
        let fleet = vec![
            equipment("eq-1", EquipmentState::Operational),
            equipment("eq-2", EquipmentState::Operational),
        ];
        // eq-1 has a 24h gap; eq-2 has a single event
        let breakdowns = vec![
            breakdown("b1", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-01T00:00:00Z"),
            breakdown("b2", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-02T00:00:00Z"),
            breakdown("b3", "eq-2", BreakdownStatus::Resolved, Severity::Low, "2026-05-02T00:00:00Z"),
        ];

        let metrics = generate_comprehensive_metrics(&fleet, &[], &breakdowns, &[], &[], now());
        assert_eq!(metrics.mtbf.value_hours, Some(24.0));
        assert!(metrics.equipment[1].mtbf_hours.is_none());
    }

    #[test]
    fn test_best_equipment_tie_breaks_by_id_ascending() {
        let fleet = vec![
            equipment("eq-b", EquipmentState::Operational),
            equipment("eq-a", EquipmentState::Operational),
        ];
        // Identical histories -> identical MTBF; lowest id wins
        let breakdowns = vec![
            breakdown("b1", "eq-a", BreakdownStatus::Resolved, Severity::Low, "2026-05-01T00:00:00Z"),
            breakdown("b2", "eq-a", BreakdownStatus::Resolved, Severity::Low, "2026-05-02T00:00:00Z"),
            breakdown("b3", "eq-b", BreakdownStatus::Resolved, Severity::Low, "2026-05-01T00:00:00Z"),
            breakdown("b4", "eq-b", BreakdownStatus::Resolved, Severity::Low, "2026-05-02T00:00:00Z"),
        ];

        let metrics = generate_comprehensive_metrics(&fleet, &[], &breakdowns, &[], &[], now());
        assert_eq!(metrics.mtbf.best_equipment.as_deref(), Some("eq-a"));
    }

    #[test]
    fn test_best_mttr_is_lowest() {
        let fleet = vec![
            equipment("eq-1", EquipmentState::Operational),
            equipment("eq-2", EquipmentState::Operational),
        ];
        let breakdowns = vec![
            breakdown("b1", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-01T00:00:00Z"),
            breakdown("b2", "eq-2", BreakdownStatus::Resolved, Severity::Low, "2026-05-01T00:00:00Z"),
        ];
        let repairs = vec![
            repair_for("r1", "eq-1", "b1", "2026-05-01T12:00:00Z"), // 12h
            repair_for("r2", "eq-2", "b2", "2026-05-01T02:00:00Z"), // 2h
        ];

        let metrics =
            generate_comprehensive_metrics(&fleet, &[], &breakdowns, &repairs, &[], now());
        assert_eq!(metrics.mttr.best_equipment.as_deref(), Some("eq-2"));
        assert_eq!(metrics.mttr.value_hours, Some(7.0));
    }

    #[test]
    fn test_completion_and_preventive_share() {
        let repairs = vec![
            repair("r1", "eq-1", RepairStatus::Completed, RepairKind::Preventive, Some("2026-05-20T00:00:00Z")),
            repair("r2", "eq-1", RepairStatus::Completed, RepairKind::Corrective, Some("2026-05-21T00:00:00Z")),
            repair("r3", "eq-1", RepairStatus::Scheduled, RepairKind::Corrective, None),
            repair("r4", "eq-1", RepairStatus::InProgress, RepairKind::Corrective, None),
        ];

        let metrics = generate_comprehensive_metrics(&[], &[], &[], &repairs, &[], now());
        assert_eq!(metrics.completion.rate_percent, 50.0);
        assert_eq!(metrics.completion.preventive_percent, 25.0);
    }

    #[test]
    fn test_maintenance_completion_percent() {
        let tasks = vec![
            maintenance("m1", "eq-1", MaintenanceStatus::Completed, "2026-05-01T00:00:00Z", Some("2026-04-30T00:00:00Z")),
            maintenance("m2", "eq-1", MaintenanceStatus::Planned, "2026-06-10T00:00:00Z", None),
        ];
        let metrics = generate_comprehensive_metrics(&[], &[], &[], &[], &tasks, now());
        assert_eq!(metrics.completion.maintenance_completion_percent, 50.0);
    }

    #[test]
    fn test_mtbf_change_over_trailing_periods() {
        let fleet = vec![equipment("eq-1", EquipmentState::Operational)];
        // Previous period (Apr 2 - May 2): gap 24h. Current (May 2 - Jun 1): gap 48h.
        let breakdowns = vec![
            breakdown("p1", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-04-10T00:00:00Z"),
            breakdown("p2", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-04-11T00:00:00Z"),
            breakdown("c1", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-10T00:00:00Z"),
            breakdown("c2", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-12T00:00:00Z"),
        ];

        let metrics = generate_comprehensive_metrics(&fleet, &[], &breakdowns, &[], &[], now());
        assert_eq!(metrics.mtbf.change_hours, Some(24.0)); // 48 - 24
    }

    #[test]
    fn test_change_is_none_when_a_window_is_empty() {
        let fleet = vec![equipment("eq-1", EquipmentState::Operational)];
        let breakdowns = vec![
            breakdown("c1", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-10T00:00:00Z"),
            breakdown("c2", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-12T00:00:00Z"),
        ];
        let metrics = generate_comprehensive_metrics(&fleet, &[], &breakdowns, &[], &[], now());
        assert!(metrics.mtbf.change_hours.is_none());
    }

    #[test]
    fn test_malformed_repair_excluded() {
        // Repair "completed" before the failure occurred: excluded, not an error
        let fleet = vec![equipment("eq-1", EquipmentState::Operational)];
        let breakdowns = vec![breakdown(
            "b1", "eq-1", BreakdownStatus::Resolved, Severity::Low, "2026-05-10T00:00:00Z",
        )];
        let repairs = vec![repair_for("r1", "eq-1", "b1", "2026-05-09T00:00:00Z")];

        let metrics =
            generate_comprehensive_metrics(&fleet, &[], &breakdowns, &repairs, &[], now());
        assert!(metrics.equipment[0].mttr_hours.is_none());
    }

    #[test]
    fn test_deterministic_output() {
        let fleet = vec![
            equipment("eq-1", EquipmentState::Operational),
            equipment("eq-2", EquipmentState::Stopped),
        ];
        let breakdowns = vec![
            resolved_breakdown("b1", "eq-1", "2026-05-01T00:00:00Z", "2026-05-01T04:00:00Z"),
            resolved_breakdown("b2", "eq-1", "2026-05-03T00:00:00Z", "2026-05-03T09:00:00Z"),
        ];
        let repairs = vec![repair_for("r1", "eq-1", "b1", "2026-05-01T04:00:00Z")];

        let a = generate_comprehensive_metrics(&fleet, &[], &breakdowns, &repairs, &[], now());
        let b = generate_comprehensive_metrics(&fleet, &[], &breakdowns, &repairs, &[], now());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_unknown_equipment_breakdowns_ignored() {
        let fleet = vec![equipment("eq-1", EquipmentState::Operational)];
        let breakdowns = vec![
            breakdown("b1", "eq-ghost", BreakdownStatus::Reported, Severity::Low, "2026-05-01T00:00:00Z"),
            breakdown("b2", "eq-ghost", BreakdownStatus::Reported, Severity::Low, "2026-05-02T00:00:00Z"),
        ];
        let metrics = generate_comprehensive_metrics(&fleet, &[], &breakdowns, &[], &[], now());
        assert!(metrics.mtbf.value_hours.is_none());
        assert_eq!(metrics.equipment.len(), 1);
        assert_eq!(metrics.equipment[0].breakdowns, 0);
    }
}

//! Pure, deterministic aggregation from raw record sets to derived metrics.
//!
//! Nothing in this module performs I/O or touches shared state; every
//! function is a pure transformation of the records it is given, with any
//! "now" passed in explicitly. Empty or insufficient input is a normal
//! state represented in the output, never an error.

pub mod daily;
pub mod fleet;
pub mod score;
pub mod trend;

pub use daily::{BreakdownCounts, DailyStats, EquipmentCounts, RepairCounts, calculate_daily_stats};
pub use fleet::{
    CompletionSummary, EquipmentReliability, FleetMetrics, MetricSummary,
    generate_comprehensive_metrics,
};
pub use score::{EquipmentScore, Grade, calculate_equipment_score};
pub use trend::{Granularity, TrendPoint, generate_trend_data};

//! Process-wide report cache.
//!
//! Serves the most recent non-stale computed report for a logical key,
//! deduplicating concurrent recomputation per key (single-flight) and
//! supporting explicit, pattern-based, and domain-driven invalidation.

pub mod store;

use std::fmt;
use std::time::Duration;

/// Cache TTL configuration per report type
///
/// These constants define how long each derived report stays fresh before
/// the next request recomputes it.
pub struct CacheTtl;

impl CacheTtl {
    // Dashboard aggregates combine every record set; recomputing is the
    // expensive path, so they get the longest production TTL.
    pub const DASHBOARD: Duration = Duration::from_secs(4 * 60); // 4 min

    // Realtime views feed auto-refreshing panels
    pub const REALTIME: Duration = Duration::from_secs(30); // 30 sec

    // Per-equipment health scores and trend series share the dashboard
    // refresh window
    pub const SCORES: Duration = Duration::from_secs(4 * 60); // 4 min
}

/// Domain tag for table-driven invalidation fan-out.
///
/// Derived reports are computed across record sets, so a raw-data mutation
/// in one domain silently stales cached views in dependent domains. Each
/// tag maps to the fixed set of key patterns that must be dropped when a
/// record in that domain changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Equipment,
    Status,
    Breakdown,
    Repair,
    Dashboard,
}

impl Domain {
    /// Key patterns invalidated when this domain changes.
    ///
    /// Patterns match the whole key string (regular-expression semantics,
    /// anchored by the cache).
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            // Equipment edits change fleet composition and dashboard counts
            Domain::Equipment => &["equipment.*", "dashboard.*"],
            // Status changes move equipment between states
            Domain::Status => &["status.*", "equipment.*", "dashboard.*"],
            // New breakdowns affect status-derived views and the dashboard,
            // but not repair reports
            Domain::Breakdown => &["breakdown.*", "status.*", "dashboard.*"],
            // Repairs resolve breakdowns and shift equipment scores
            Domain::Repair => &["repair.*", "breakdown.*", "equipment.*", "dashboard.*"],
            Domain::Dashboard => &["dashboard.*"],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Equipment => "equipment",
            Domain::Status => "status",
            Domain::Breakdown => "breakdown",
            Domain::Repair => "repair",
            Domain::Dashboard => "dashboard",
        };
        f.write_str(name)
    }
}

// Re-export main types
pub use store::{CacheStats, ReportCache};

//! Time-bucketed breakdown/repair counts for chart rendering.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BreakdownReport, RepairReport};

/// Bucket width for trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// One bucket of the trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// First day of the bucket (UTC). Buckets cover `[start, next start)`.
    pub bucket: NaiveDate,
    pub breakdowns: usize,
    pub repairs: usize,
}

/// Bucket breakdown and repair events by occurrence time.
///
/// The series spans from the earliest to the latest bucket touched by any
/// event, in chronological order, with zero-count points filling the gaps
/// so charts render without holes. An event exactly on a bucket boundary
/// belongs to the bucket starting at that boundary. Empty input produces
/// an empty series.
pub fn generate_trend_data(
    breakdowns: &[BreakdownReport],
    repairs: &[RepairReport],
    granularity: Granularity,
) -> Vec<TrendPoint> {
    let mut counts: HashMap<NaiveDate, (usize, usize)> = HashMap::new();

    for report in breakdowns {
        let bucket = bucket_start(report.occurred_at, granularity);
        counts.entry(bucket).or_default().0 += 1;
    }
    for repair in repairs {
        let bucket = bucket_start(repair.occurrence(), granularity);
        counts.entry(bucket).or_default().1 += 1;
    }

    let (Some(&first), Some(&last)) = (counts.keys().min(), counts.keys().max()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut bucket = first;
    while bucket <= last {
        let (breakdowns, repairs) = counts.get(&bucket).copied().unwrap_or_default();
        series.push(TrendPoint {
            bucket,
            breakdowns,
            repairs,
        });
        bucket = next_bucket(bucket, granularity);
    }
    series
}

/// Map a timestamp to the first day of its bucket.
fn bucket_start(at: DateTime<Utc>, granularity: Granularity) -> NaiveDate {
    let date = at.date_naive();
    match granularity {
        Granularity::Daily => date,
        // ISO weeks starting Monday
        Granularity::Weekly => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        Granularity::Monthly => date.with_day(1).unwrap_or(date),
    }
}

fn next_bucket(bucket: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Daily => bucket + Duration::days(1),
        Granularity::Weekly => bucket + Duration::days(7),
        Granularity::Monthly => bucket + Months::new(1),
    }
}

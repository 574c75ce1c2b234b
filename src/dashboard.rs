//! Dashboard service: cached, report-shaped views over the record
//! provider.
//!
//! Every read goes through the report cache, so concurrent dashboard
//! loads share one backend round trip and repeat loads within the TTL
//! are served from memory. Writers report mutations through
//! [`DashboardService::record_mutation`], which drops every cached view
//! the mutated record set can influence.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheTtl, Domain, ReportCache};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::{
    DailyStats, EquipmentScore, FleetMetrics, Granularity, TrendPoint, calculate_daily_stats,
    calculate_equipment_score, generate_comprehensive_metrics, generate_trend_data,
};
use crate::models::RecordSnapshot;
use crate::provider::{RecordProvider, fetch_snapshot};

/// Everything the dashboard landing page renders, in one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub stats: DailyStats,
    pub fleet: FleetMetrics,
    pub trend: Vec<TrendPoint>,
    pub scores: Vec<EquipmentScore>,
    pub generated_at: DateTime<Utc>,
}

struct Ttls {
    dashboard: Duration,
    realtime: Duration,
    scores: Duration,
}

/// Cached analytics facade over a record provider.
pub struct DashboardService<P: RecordProvider + 'static> {
    provider: Arc<P>,
    cache: ReportCache,
    ttl: Ttls,
}

impl<P: RecordProvider + 'static> DashboardService<P> {
    /// Create a service with TTLs and sweep interval from configuration.
    pub fn new(provider: Arc<P>, config: &Config) -> Self {
        Self {
            provider,
            cache: ReportCache::new(config.cache.sweep_interval()),
            ttl: Ttls {
                dashboard: config.cache.dashboard_ttl(),
                realtime: config.cache.realtime_ttl(),
                scores: config.cache.scores_ttl(),
            },
        }
    }

    /// Create a service with the built-in default TTLs.
    pub fn with_defaults(provider: Arc<P>) -> Self {
        Self {
            provider,
            cache: ReportCache::new(Duration::from_secs(60)),
            ttl: Ttls {
                dashboard: CacheTtl::DASHBOARD,
                realtime: CacheTtl::REALTIME,
                scores: CacheTtl::SCORES,
            },
        }
    }

    /// The full dashboard report: daily stats, fleet metrics, the daily
    /// trend, and per-equipment scores.
    pub async fn dashboard_analytics(&self) -> Result<DashboardReport> {
        let provider = Arc::clone(&self.provider);
        self.cache
            .get_or_compute("dashboard-analytics", self.ttl.dashboard, move || async move {
                let snapshot = fetch_snapshot(provider.as_ref()).await?;
                Ok(build_report(&snapshot))
            })
            .await
    }

    /// Current breakdown/repair/equipment counts, on the short TTL.
    pub async fn realtime_snapshot(&self) -> Result<DailyStats> {
        let provider = Arc::clone(&self.provider);
        self.cache
            .get_or_compute("realtime-data", self.ttl.realtime, move || async move {
                let snapshot = fetch_snapshot(provider.as_ref()).await?;
                Ok(calculate_daily_stats(
                    &snapshot.breakdowns,
                    &snapshot.repairs,
                    &snapshot.equipment,
                    &snapshot.statuses,
                ))
            })
            .await
    }

    /// Health scores for every piece of equipment, id-ordered.
    pub async fn equipment_scores(&self) -> Result<Vec<EquipmentScore>> {
        let provider = Arc::clone(&self.provider);
        self.cache
            .get_or_compute("equipment-scores", self.ttl.scores, move || async move {
                let snapshot = fetch_snapshot(provider.as_ref()).await?;
                Ok(score_all(&snapshot))
            })
            .await
    }

    /// Breakdown/repair trend at the requested granularity. Each
    /// granularity is cached under its own key.
    pub async fn trend(&self, granularity: Granularity) -> Result<Vec<TrendPoint>> {
        let provider = Arc::clone(&self.provider);
        let key = format!("dashboard-trend-{}", granularity);
        self.cache
            .get_or_compute(&key, self.ttl.dashboard, move || async move {
                let snapshot = fetch_snapshot(provider.as_ref()).await?;
                Ok(generate_trend_data(
                    &snapshot.breakdowns,
                    &snapshot.repairs,
                    granularity,
                ))
            })
            .await
    }

    /// Drop every cached view the mutated record set can influence.
    /// Returns the number of entries removed.
    pub fn record_mutation(&self, domain: Domain) -> Result<usize> {
        self.cache.invalidate_related(domain)
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }
}

fn build_report(snapshot: &RecordSnapshot) -> DashboardReport {
    DashboardReport {
        stats: calculate_daily_stats(
            &snapshot.breakdowns,
            &snapshot.repairs,
            &snapshot.equipment,
            &snapshot.statuses,
        ),
        fleet: generate_comprehensive_metrics(
            &snapshot.equipment,
            &snapshot.statuses,
            &snapshot.breakdowns,
            &snapshot.repairs,
            &snapshot.maintenance,
            snapshot.fetched_at,
        ),
        trend: generate_trend_data(&snapshot.breakdowns, &snapshot.repairs, Granularity::Daily),
        scores: score_all(snapshot),
        generated_at: snapshot.fetched_at,
    }
}

fn score_all(snapshot: &RecordSnapshot) -> Vec<EquipmentScore> {
    let mut equipment: Vec<_> = snapshot.equipment.iter().collect();
    equipment.sort_by(|a, b| a.id.cmp(&b.id));
    equipment
        .into_iter()
        .map(|e| {
            calculate_equipment_score(
                e,
                &snapshot.statuses,
                &snapshot.breakdowns,
                &snapshot.maintenance,
                snapshot.fetched_at,
            )
        })
        .collect()
}

//! PlantOps analytics core: a cached, single-flight analytics layer for
//! maintenance records.
//!
//! The crate has three layers:
//!
//! - [`provider`]: fetching equipment, status, breakdown, repair and
//!   maintenance records from the backend REST API (or a mock in tests)
//! - [`metrics`]: pure, deterministic aggregation of those records into
//!   daily stats, fleet reliability metrics, trends and health scores
//! - [`cache`] and [`dashboard`]: a TTL cache with single-flight
//!   deduplication, and the service that serves report-shaped views
//!   through it
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use plantops::config::Config;
//! use plantops::dashboard::DashboardService;
//! use plantops::provider::RestProvider;
//!
//! # async fn run() -> plantops::error::Result<()> {
//! let config = Config::load()?;
//! let provider = Arc::new(RestProvider::new(&config.backend)?);
//! let service = DashboardService::new(provider, &config);
//!
//! let report = service.dashboard_analytics().await?;
//! println!("{} equipment scored", report.scores.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod models;
pub mod provider;

pub use cache::{CacheStats, CacheTtl, Domain, ReportCache};
pub use dashboard::{DashboardReport, DashboardService};
pub use error::{Error, Result};

//! Record providers: the upstream source of maintenance records.
//!
//! The cache and dashboard layers only ever see the [`RecordProvider`]
//! trait, so tests swap in [`mock::MockProvider`] and production uses
//! [`RestProvider`] against the backend REST API.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    BreakdownReport, Equipment, MaintenanceTask, RecordSnapshot, RepairReport, StatusRecord,
};

#[cfg(test)]
pub mod mock;
pub mod rest;

#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockProvider;
pub use rest::RestProvider;

/// Read access to the maintenance record sets.
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// List all registered equipment
    async fn list_equipment(&self) -> Result<Vec<Equipment>>;

    /// List equipment status change records
    async fn list_statuses(&self) -> Result<Vec<StatusRecord>>;

    /// List breakdown reports
    async fn list_breakdowns(&self) -> Result<Vec<BreakdownReport>>;

    /// List repair reports
    async fn list_repairs(&self) -> Result<Vec<RepairReport>>;

    /// List planned maintenance tasks
    async fn list_maintenance(&self) -> Result<Vec<MaintenanceTask>>;
}

/// Fetch all five record sets concurrently into one snapshot.
pub async fn fetch_snapshot<P: RecordProvider + ?Sized>(provider: &P) -> Result<RecordSnapshot> {
    let (equipment, statuses, breakdowns, repairs, maintenance) = futures::try_join!(
        provider.list_equipment(),
        provider.list_statuses(),
        provider.list_breakdowns(),
        provider.list_repairs(),
        provider.list_maintenance(),
    )?;

    Ok(RecordSnapshot {
        equipment,
        statuses,
        breakdowns,
        repairs,
        maintenance,
        fetched_at: chrono::Utc::now(),
    })
}

//! Mock record provider for testing the cache and dashboard layers
//! without a backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::RecordProvider;
use crate::error::{ApiError, Result};
use crate::models::{
    BreakdownReport, Equipment, MaintenanceTask, RepairReport, StatusRecord,
};

/// Tracks provider call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_equipment: usize,
    pub list_statuses: usize,
    pub list_breakdowns: usize,
    pub list_repairs: usize,
    pub list_maintenance: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_equipment
            + self.list_statuses
            + self.list_breakdowns
            + self.list_repairs
            + self.list_maintenance
    }
}

/// Mock provider: configure record sets via builder methods, then assert
/// on call counts.
#[derive(Default)]
pub struct MockProvider {
    equipment: Arc<Mutex<Vec<Equipment>>>,
    statuses: Arc<Mutex<Vec<StatusRecord>>>,
    breakdowns: Arc<Mutex<Vec<BreakdownReport>>>,
    repairs: Arc<Mutex<Vec<RepairReport>>>,
    maintenance: Arc<Mutex<Vec<MaintenanceTask>>>,
    /// Error returned by every call while set
    error: Arc<Mutex<Option<ApiError>>>,
    /// Artificial latency per call, to widen concurrency windows in tests
    delay: Arc<Mutex<Option<Duration>>>,
    call_count: Arc<Mutex<CallCounts>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_equipment(self, equipment: Vec<Equipment>) -> Self {
        *self.equipment.lock().await = equipment;
        self
    }

    pub async fn with_statuses(self, statuses: Vec<StatusRecord>) -> Self {
        *self.statuses.lock().await = statuses;
        self
    }

    pub async fn with_breakdowns(self, breakdowns: Vec<BreakdownReport>) -> Self {
        *self.breakdowns.lock().await = breakdowns;
        self
    }

    pub async fn with_repairs(self, repairs: Vec<RepairReport>) -> Self {
        *self.repairs.lock().await = repairs;
        self
    }

    pub async fn with_maintenance(self, maintenance: Vec<MaintenanceTask>) -> Self {
        *self.maintenance.lock().await = maintenance;
        self
    }

    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    pub async fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().await = Some(delay);
        self
    }

    /// Clear any injected error so later calls succeed.
    pub async fn clear_error(&self) {
        *self.error.lock().await = None;
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    async fn before_call(&self) -> Result<()> {
        if let Some(delay) = *self.delay.lock().await {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.error.lock().await.clone() {
            return Err(error.into());
        }
        Ok(())
    }
}

#[async_trait]
impl RecordProvider for MockProvider {
    async fn list_equipment(&self) -> Result<Vec<Equipment>> {
        self.call_count.lock().await.list_equipment += 1;
        self.before_call().await?;
        Ok(self.equipment.lock().await.clone())
    }

    async fn list_statuses(&self) -> Result<Vec<StatusRecord>> {
        self.call_count.lock().await.list_statuses += 1;
        self.before_call().await?;
        Ok(self.statuses.lock().await.clone())
    }

    async fn list_breakdowns(&self) -> Result<Vec<BreakdownReport>> {
        self.call_count.lock().await.list_breakdowns += 1;
        self.before_call().await?;
        Ok(self.breakdowns.lock().await.clone())
    }

    async fn list_repairs(&self) -> Result<Vec<RepairReport>> {
        self.call_count.lock().await.list_repairs += 1;
        self.before_call().await?;
        Ok(self.repairs.lock().await.clone())
    }

    async fn list_maintenance(&self) -> Result<Vec<MaintenanceTask>> {
        self.call_count.lock().await.list_maintenance += 1;
        self.before_call().await?;
        Ok(self.maintenance.lock().await.clone())
    }
}

//! REST implementation of the record provider.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use super::RecordProvider;
use crate::config::BackendConfig;
use crate::error::{ApiError, Result};
use crate::models::{
    BreakdownReport, Equipment, MaintenanceTask, RepairReport, StatusRecord,
};

/// Request timeout for backend calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Record provider backed by the maintenance backend's REST API.
pub struct RestProvider {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl RestProvider {
    /// Create a provider from backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Create a provider against an explicit base URL, mainly for tests.
    pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Result<Self> {
        Self::new(&BackendConfig {
            base_url: base_url.to_string(),
            api_key,
        })
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self.http.get(&url);
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let data = response.json::<Vec<T>>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(data)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl RecordProvider for RestProvider {
    async fn list_equipment(&self) -> Result<Vec<Equipment>> {
        self.get_list("/equipment").await
    }

    async fn list_statuses(&self) -> Result<Vec<StatusRecord>> {
        self.get_list("/status-records").await
    }

    async fn list_breakdowns(&self) -> Result<Vec<BreakdownReport>> {
        self.get_list("/breakdowns").await
    }

    async fn list_repairs(&self) -> Result<Vec<RepairReport>> {
        self.get_list("/repairs").await
    }

    async fn list_maintenance(&self) -> Result<Vec<MaintenanceTask>> {
        self.get_list("/maintenance-tasks").await
    }
}

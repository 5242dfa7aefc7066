//! Device-status collaborator client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use ops_voice_config::BackendConfig;
use ops_voice_core::{DeviceStatusBackend, DeviceStatusCounts, Result};

use crate::ClientError;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    working: u32,
    not_working: u32,
    partially_working: u32,
}

/// Client for the device-status counts behind the quick-action panel
pub struct DeviceStatusClient {
    client: Client,
    url: String,
}

impl DeviceStatusClient {
    pub fn new(config: &BackendConfig) -> std::result::Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                config.device_status_path
            ),
        })
    }

    async fn status_inner(
        &self,
        branch_context: &str,
        category: &str,
    ) -> std::result::Result<DeviceStatusCounts, ClientError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("branch", branch_context), ("category", category)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        Ok(DeviceStatusCounts {
            working: body.working,
            not_working: body.not_working,
            partially_working: body.partially_working,
        })
    }
}

#[async_trait]
impl DeviceStatusBackend for DeviceStatusClient {
    async fn status(&self, branch_context: &str, category: &str) -> Result<DeviceStatusCounts> {
        let counts = self
            .status_inner(branch_context, category)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, category, "device status request failed");
                e
            })?;
        Ok(counts)
    }
}

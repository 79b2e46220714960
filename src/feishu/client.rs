//! Feishu API client
//!
//! Implements the auth and upload capabilities against the open platform:
//! tenant tokens from the internal-app auth endpoint, records through the
//! bitable batch create endpoint.

use super::types::{
    batch_create_path, ApiEnvelope, AppTableRecord, BatchCreateData, BatchCreateRequest,
    TenantTokenRequest, TenantTokenResponse, TENANT_TOKEN_PATH,
};
use crate::auth::IssuedToken;
use crate::config::{DriveTarget, FeishuConfig, FieldMapping, MAX_BATCH_SIZE};
use crate::connector::{RecordUploader, TokenProvider};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::transform::DestinationRecord;
use async_trait::async_trait;
use tracing::{debug, info};

/// Client for the Feishu auth and bitable endpoints
#[derive(Debug)]
pub struct FeishuClient {
    http: HttpClient,
    mapping: FieldMapping,
    batch_size: usize,
}

impl FeishuClient {
    /// Create a client from the `feishu` settings
    pub fn new(config: &FeishuConfig, mapping: FieldMapping) -> Result<Self> {
        let http_config = HttpClientConfig::new(config.base_url.clone())
            .with_timeout(config.timeout())
            .with_rate_limit(Some(RateLimiterConfig::per_second(
                config.requests_per_second,
            )));

        Ok(Self {
            http: HttpClient::new(http_config)?,
            mapping,
            batch_size: MAX_BATCH_SIZE,
        })
    }

    /// Limit the number of records per request (clamped to 1..=500)
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Records per request
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn to_wire(&self, record: &DestinationRecord) -> AppTableRecord {
        AppTableRecord {
            fields: record.to_fields(&self.mapping),
            record_id: None,
            created_time: Some(record.created_time),
            last_modified_time: Some(record.modified_time),
        }
    }

    async fn create_chunk(
        &self,
        path: &str,
        chunk: &[DestinationRecord],
        bearer_token: &str,
    ) -> Result<usize> {
        let body = BatchCreateRequest {
            records: chunk.iter().map(|r| self.to_wire(r)).collect(),
        };

        let envelope: ApiEnvelope<BatchCreateData> = self
            .http
            .post_json(path, &body, Some(bearer_token))
            .await?;

        if envelope.code != 0 {
            return Err(Error::api(envelope.code, envelope.msg));
        }

        if let Some(data) = envelope.data {
            debug!("Batch create returned {} records", data.records.len());
        }
        Ok(chunk.len())
    }
}

#[async_trait]
impl TokenProvider for FeishuClient {
    async fn fetch_tenant_token(&self, app_id: &str, app_secret: &str) -> Result<IssuedToken> {
        let body = TenantTokenRequest { app_id, app_secret };
        let response: TenantTokenResponse = self
            .http
            .post_json(TENANT_TOKEN_PATH, &body, None)
            .await?;

        if response.code != 0 {
            return Err(Error::api(response.code, response.msg));
        }
        debug!("Tenant access token issued, lifetime {}s", response.expire);

        Ok(IssuedToken::new(
            response.tenant_access_token,
            response.expire,
        ))
    }
}

#[async_trait]
impl RecordUploader for FeishuClient {
    async fn batch_create_records(
        &self,
        target: &DriveTarget,
        records: &[DestinationRecord],
        bearer_token: &str,
    ) -> Result<usize> {
        let path = batch_create_path(&target.base_id, &target.table_id);
        let chunks = records.len().div_ceil(self.batch_size);
        let mut created = 0;

        for (index, chunk) in records.chunks(self.batch_size).enumerate() {
            debug!(
                "Uploading chunk {}/{} ({} records) to table {}",
                index + 1,
                chunks,
                chunk.len(),
                target.table_id
            );
            created += self
                .create_chunk(&path, chunk, bearer_token)
                .await
                .map_err(|e| {
                    tracing::error!("Chunk {}/{} failed: {}", index + 1, chunks, e);
                    e
                })?;
        }

        info!(
            "Created {} records in {}/{}",
            created, target.base_id, target.table_id
        );
        Ok(created)
    }
}

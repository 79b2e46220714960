//! Wire types for the Feishu open platform

use crate::types::JsonObject;
use serde::{Deserialize, Serialize};

/// Tenant token endpoint, relative to the base URL
pub const TENANT_TOKEN_PATH: &str = "/open-apis/auth/v3/tenant_access_token/internal";

/// Batch create endpoint for a bitable table
pub fn batch_create_path(base_id: &str, table_id: &str) -> String {
    format!("/open-apis/bitable/v1/apps/{base_id}/tables/{table_id}/records/batch_create")
}

/// Body of the tenant token request
#[derive(Debug, Clone, Serialize)]
pub struct TenantTokenRequest<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

/// Response of the tenant token endpoint (not wrapped in `data`)
#[derive(Debug, Clone, Deserialize)]
pub struct TenantTokenResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub tenant_access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expire: i64,
}

/// Common response envelope of the bitable API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// A bitable record as sent to the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppTableRecord {
    pub fields: JsonObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<i64>,
}

/// Body of the batch create request
#[derive(Debug, Clone, Serialize)]
pub struct BatchCreateRequest {
    pub records: Vec<AppTableRecord>,
}

/// `data` of a batch create response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchCreateData {
    #[serde(default)]
    pub records: Vec<AppTableRecord>,
}

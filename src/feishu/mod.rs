//! Feishu (Lark) open platform client
//!
//! Production implementation of the [`TokenProvider`](crate::connector::TokenProvider)
//! and [`RecordUploader`](crate::connector::RecordUploader) capabilities.

mod client;
mod types;

pub use client::FeishuClient;
pub use types::{
    batch_create_path, ApiEnvelope, AppTableRecord, BatchCreateData, BatchCreateRequest,
    TenantTokenRequest, TenantTokenResponse, TENANT_TOKEN_PATH,
};

#[cfg(test)]
mod tests;

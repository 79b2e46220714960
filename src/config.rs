//! Settings for a sync run
//!
//! This module contains the configuration structures loaded from the
//! YAML settings file. The settings are built once at startup and passed
//! by reference to each component.

use crate::error::{Error, Result};
use crate::template::{self, TemplateContext};
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default settings file name, looked up next to the executable
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Largest number of records the bitable API accepts per batch request
pub const MAX_BATCH_SIZE: usize = 500;

// ============================================================================
// Top-Level Settings
// ============================================================================

/// Complete settings loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level used when `RUST_LOG` is not set
    #[serde(default)]
    pub log_level: LogLevel,

    /// Local embedded store (watermarks and token cache)
    #[serde(default)]
    pub local: LocalStoreConfig,

    /// Source database holding the feedback table
    pub source: SourceConfig,

    /// Sync behaviour
    #[serde(default)]
    pub sync: SyncSettings,

    /// Destination API
    pub feishu: FeishuConfig,

    /// Destination field names and constant values
    #[serde(default)]
    pub mapping: FieldMapping,
}

impl Settings {
    /// Load settings from a YAML file, interpolating `{{ env.* }}` from the process environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read settings file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml(&content, &TemplateContext::from_env())
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str, ctx: &TemplateContext) -> Result<Self> {
        let rendered = template::render(yaml, ctx)?;
        let settings: Settings = serde_yaml::from_str(&rendered)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Path of the default settings file: `config.yaml` beside the executable
    pub fn default_path() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| Error::config("Executable has no parent directory"))?;
        Ok(dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Validate settings after parsing
    pub fn validate(&self) -> Result<()> {
        if self.local.path.as_os_str().is_empty() {
            return Err(Error::missing_field("local.path"));
        }

        if self.source.table.is_empty() {
            return Err(Error::missing_field("source.table"));
        }
        if self.source.connection_string.is_none() && self.source.database.is_none() {
            return Err(Error::missing_field("source.database"));
        }

        if self.sync.max_drift_rows <= 0 {
            return Err(Error::invalid_value(
                "sync.max_drift_rows",
                "must be greater than zero",
            ));
        }
        if self.sync.batch_size == 0 || self.sync.batch_size > MAX_BATCH_SIZE {
            return Err(Error::invalid_value(
                "sync.batch_size",
                format!("must be between 1 and {MAX_BATCH_SIZE}"),
            ));
        }

        url::Url::parse(&self.feishu.base_url).map_err(|e| {
            Error::invalid_value("feishu.base_url", format!("not a valid URL: {e}"))
        })?;
        if self.feishu.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "feishu.timeout_secs",
                "must be greater than zero",
            ));
        }

        let required = [
            ("feishu.app.id", &self.feishu.app.id),
            ("feishu.app.secret", &self.feishu.app.secret),
            ("feishu.drive.base_id", &self.feishu.drive.base_id),
            ("feishu.drive.table_id", &self.feishu.drive.table_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Local Store
// ============================================================================

/// Local DuckDB file holding checkpoints and the token cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStoreConfig {
    /// Database file path
    #[serde(default = "default_local_path")]
    pub path: PathBuf,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            path: default_local_path(),
        }
    }
}

fn default_local_path() -> PathBuf {
    PathBuf::from("earthworm.duckdb")
}

// ============================================================================
// Source Database
// ============================================================================

/// Database engine the feedback table lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    #[default]
    Mysql,
    Postgres,
    Sqlite,
    Duckdb,
}

impl DatabaseKind {
    /// Default port for network databases
    pub fn default_port(self) -> u16 {
        match self {
            DatabaseKind::Mysql => 3306,
            DatabaseKind::Postgres => 5432,
            DatabaseKind::Sqlite | DatabaseKind::Duckdb => 0,
        }
    }
}

/// Source database connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Engine type
    #[serde(default)]
    pub engine: DatabaseKind,

    /// Full connection string (takes precedence over the components)
    #[serde(default)]
    pub connection_string: Option<String>,

    /// Host name
    #[serde(default)]
    pub host: Option<String>,

    /// Port
    #[serde(default)]
    pub port: Option<u16>,

    /// User name
    #[serde(default, alias = "username")]
    pub user: Option<String>,

    /// Password
    #[serde(default)]
    pub password: Option<String>,

    /// Database name (file path for sqlite / duckdb)
    #[serde(default)]
    pub database: Option<String>,

    /// Feedback table name
    #[serde(default = "default_source_table")]
    pub table: String,
}

fn default_source_table() -> String {
    "book_user_feedback".to_string()
}

// ============================================================================
// Sync
// ============================================================================

/// Sync behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Largest backlog (remote max id minus local watermark) a run may process
    #[serde(default = "default_max_drift_rows", alias = "rows")]
    pub max_drift_rows: i64,

    /// Records per upload request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_drift_rows: default_max_drift_rows(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_max_drift_rows() -> i64 {
    1000
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

// ============================================================================
// Feishu
// ============================================================================

/// Destination API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeishuConfig {
    /// API base URL
    #[serde(default = "default_feishu_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upload request rate
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Application credentials
    pub app: AppCredentials,

    /// Target bitable
    pub drive: DriveTarget,
}

impl FeishuConfig {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_feishu_base_url() -> String {
    "https://open.feishu.cn".to_string()
}

fn default_timeout_secs() -> u64 {
    3
}

fn default_requests_per_second() -> u32 {
    5
}

/// Application id and secret used to obtain a tenant access token
#[derive(Clone, Serialize, Deserialize)]
pub struct AppCredentials {
    /// App id
    pub id: String,
    /// App secret
    pub secret: String,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("id", &self.id)
            .field("secret", &"****")
            .finish()
    }
}

/// Bitable (base) and table the records are created in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveTarget {
    /// Bitable app token
    pub base_id: String,
    /// Table id inside the bitable
    pub table_id: String,
}

// ============================================================================
// Field Mapping
// ============================================================================

/// Destination column names and the constant values written into them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Column receiving the raw description
    pub summary_field: String,
    /// Column receiving the description plus contact suffix
    pub detail_field: String,
    /// Category column
    pub category_field: String,
    /// Status column
    pub status_field: String,
    /// Priority column
    pub priority_field: String,
    /// Submission date column (epoch millis)
    pub submitted_at_field: String,
    /// Parent record link column
    pub parent_field: String,

    /// Category written for every record
    pub category: String,
    /// Status written for every record
    pub status: String,
    /// Priority written for every record
    pub priority: String,
    /// Record id every new record links to
    pub parent_record_id: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            summary_field: "需求描述".to_string(),
            detail_field: "需求详细描述（可附文档）".to_string(),
            category_field: "需求分类".to_string(),
            status_field: "需求状态".to_string(),
            priority_field: "优先级".to_string(),
            submitted_at_field: "需求提出日期".to_string(),
            parent_field: "父记录".to_string(),
            category: "用户需求反馈".to_string(),
            status: "待评估".to_string(),
            priority: "低 - P2".to_string(),
            parent_record_id: "recumeyGcqvGUP".to_string(),
        }
    }
}

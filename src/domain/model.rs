use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A PocketBase record as it travels through export and import: an opaque
/// JSON object whose shape belongs to the user's collection schema.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Collection metadata from `GET /api/collections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub updated: String,
}

/// One page of a PocketBase list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    /// `-1` when the request asked PocketBase to skip counting.
    #[serde(default)]
    pub total_items: i64,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Ndjson,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Ndjson => "ndjson",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "ndjson" => Ok(ExportFormat::Ndjson),
            other => Err(format!("unsupported format '{}', expected json or ndjson", other)),
        }
    }
}

/// Body of a `<collection>.json` export file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub collection: String,
    pub exported_at: String,
    pub items: Vec<Record>,
}

/// One entry of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub collection: String,
    pub records: usize,
}

/// Token and auth record held by the client after a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub record: Option<serde_json::Value>,
    pub is_admin: bool,
}

impl AuthSession {
    pub fn record_id(&self) -> Option<&str> {
        self.record
            .as_ref()
            .and_then(|r| r.get("id"))
            .and_then(|id| id.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

/// Outcome of one collection (export) or one input file (import).
#[derive(Debug, Clone, Default)]
pub struct CollectionReport {
    pub collection: String,
    pub source: Option<PathBuf>,
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<String>,
    pub skipped: Option<String>,
}

impl CollectionReport {
    pub fn skipped(collection: impl Into<String>, source: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            source: Some(source),
            skipped: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub pipeline: String,
    pub collections: Vec<CollectionReport>,
    pub output_path: Option<PathBuf>,
    /// Set by the engine once the run completes.
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn total_records(&self) -> usize {
        self.collections.iter().map(|c| c.total).sum()
    }

    pub fn total_succeeded(&self) -> usize {
        self.collections.iter().map(|c| c.succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.collections.iter().map(|c| c.failed()).sum()
    }
}

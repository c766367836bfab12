use crate::client::filter::build_filter;
use crate::client::PocketBaseClient;
use crate::config::settings::ImportSettings;
use crate::core::records::{
    clean_record, discover_files, file_stem, infer_collection, RecordSource, MANIFEST_STEM,
};
use crate::domain::model::{CollectionReport, Record, RunReport};
use crate::domain::ports::Pipeline;
use crate::utils::error::{KitError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Failure messages kept in the log per file.
const SHOWN_FAILURES: usize = 3;
/// Response body characters kept in a failure message.
const FAILURE_BODY_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub files: Vec<PathBuf>,
    /// Collection names that exist on the target server.
    pub collections: HashSet<String>,
}

/// Loads export files into PocketBase, creating records or patching the
/// ones matched by an upsert field.
pub struct ImportPipeline {
    client: Arc<PocketBaseClient>,
    settings: ImportSettings,
}

impl ImportPipeline {
    pub fn new(client: Arc<PocketBaseClient>, settings: ImportSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    async fn import_file(
        &self,
        path: &Path,
        existing: &HashSet<String>,
    ) -> Result<Option<CollectionReport>> {
        if file_stem(path) == MANIFEST_STEM {
            return Ok(None);
        }

        let display_name = display_name(path);
        let mut source = RecordSource::open(path).await?;
        let declared = source.declared_collection().map(str::to_string);
        let Some(first) = source.peek().await? else {
            tracing::info!("Skipping {}: no records", display_name);
            return Ok(Some(CollectionReport::skipped(
                declared.unwrap_or_else(|| file_stem(path)),
                path.to_path_buf(),
                "no records",
            )));
        };
        let collection = infer_collection(path, declared.as_deref(), Some(first));

        if !self.settings.selection.allows_name(&collection) {
            tracing::debug!("{} -> {} filtered out", display_name, collection);
            return Ok(None);
        }
        if !existing.contains(&collection) {
            if self.settings.skip_missing {
                let reason = format!("collection '{}' not found", collection);
                tracing::info!("Skipping {}: {}", display_name, reason);
                return Ok(Some(CollectionReport::skipped(
                    collection,
                    path.to_path_buf(),
                    reason,
                )));
            }
            return Err(KitError::CollectionNotFoundError { name: collection });
        }

        tracing::info!("Importing {} -> {}", display_name, collection);
        let upsert_field = self.settings.upsert.field_for(&collection);
        let concurrency = self.settings.concurrency.max(1);
        let mut report = CollectionReport {
            collection: collection.clone(),
            source: Some(path.to_path_buf()),
            ..Default::default()
        };

        loop {
            let batch = source.next_batch(self.settings.batch_size).await?;
            if batch.is_empty() {
                break;
            }

            let requests: Vec<_> = batch
                .into_iter()
                .map(|record| self.process_record(&collection, record, upsert_field))
                .collect();
            let outcomes: Vec<std::result::Result<bool, String>> = stream::iter(requests)
                .buffer_unordered(concurrency)
                .collect()
                .await;

            for outcome in outcomes {
                report.total += 1;
                match outcome {
                    Ok(true) => report.succeeded += 1,
                    Ok(false) => {}
                    Err(message) => report.failures.push(message),
                }
            }

            if !self.settings.throttle.is_zero() {
                tokio::time::sleep(self.settings.throttle).await;
            }
        }

        tracing::info!(
            "  {}/{} records processed",
            report.succeeded,
            report.total
        );
        if !report.failures.is_empty() {
            tracing::warn!(
                "  {} failures (showing up to {}):",
                report.failures.len(),
                SHOWN_FAILURES
            );
            for message in report.failures.iter().take(SHOWN_FAILURES) {
                tracing::warn!("    - {}", message);
            }
        }

        Ok(Some(report))
    }

    /// `Ok(false)` when the server accepted the request with an unexpected
    /// status, `Err` with a printable message when the request failed.
    async fn process_record(
        &self,
        collection: &str,
        record: Record,
        upsert_field: Option<&str>,
    ) -> std::result::Result<bool, String> {
        if self.settings.dry_run {
            return Ok(true);
        }
        self.write_record(collection, record, upsert_field)
            .await
            .map_err(|e| describe_failure(&e))
    }

    async fn write_record(
        &self,
        collection: &str,
        record: Record,
        upsert_field: Option<&str>,
    ) -> Result<bool> {
        let lookup = upsert_field
            .and_then(|field| record.get(field).map(|value| build_filter(field, value)));
        let data = clean_record(record);

        if let Some(filter) = lookup {
            let existing = self.client.find_first(collection, &filter).await?;
            let existing_id = existing
                .as_ref()
                .and_then(|r| r.get("id"))
                .and_then(|id| id.as_str())
                .filter(|id| !id.is_empty());
            if let Some(id) = existing_id {
                let status = self.client.update_record(collection, id, &data).await?;
                return Ok(status.is_success());
            }
        }

        let status = self.client.create_record(collection, &data).await?;
        Ok(status == StatusCode::OK || status == StatusCode::CREATED)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn describe_failure(error: &KitError) -> String {
    match error {
        KitError::ApiError { status, body } => format!(
            "HTTP {}: {}",
            status,
            body.chars().take(FAILURE_BODY_CHARS).collect::<String>()
        ),
        KitError::HttpError(e) => e.to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Pipeline for ImportPipeline {
    type Plan = ImportPlan;

    fn name(&self) -> &str {
        "PocketBase import"
    }

    async fn prepare(&self) -> Result<Self::Plan> {
        let files = discover_files(&self.settings.input_path).await?;

        if let Some(credentials) = &self.settings.credentials {
            self.client.authenticate_admin(credentials).await?;
        }
        let collections = self
            .client
            .list_collections()
            .await?
            .into_iter()
            .map(|c| c.name)
            .filter(|name| !name.is_empty())
            .collect();

        tracing::info!(
            "📋 {} data files found in {}",
            files.len(),
            self.settings.input_path.display()
        );
        if self.settings.dry_run {
            tracing::info!("Dry run: nothing will be written");
        }
        Ok(ImportPlan { files, collections })
    }

    async fn execute(&self, plan: Self::Plan) -> Result<RunReport> {
        let mut reports = Vec::new();
        for path in &plan.files {
            if let Some(report) = self.import_file(path, &plan.collections).await? {
                reports.push(report);
            }
        }

        Ok(RunReport {
            pipeline: self.name().to_string(),
            collections: reports,
            output_path: None,
            finished_at: None,
        })
    }
}

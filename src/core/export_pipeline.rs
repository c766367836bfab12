use crate::client::{PocketBaseClient, RecordQuery};
use crate::config::settings::ExportSettings;
use crate::domain::model::{
    Collection, CollectionReport, ExportDocument, ExportFormat, ManifestEntry, Record, RunReport,
};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::{KitError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const ARCHIVE_FILE: &str = "export.zip";

/// Dumps the records of the selected collections into one file per
/// collection plus a manifest.
pub struct ExportPipeline<S: Storage> {
    client: Arc<PocketBaseClient>,
    storage: S,
    settings: ExportSettings,
}

impl<S: Storage> ExportPipeline<S> {
    pub fn new(client: Arc<PocketBaseClient>, storage: S, settings: ExportSettings) -> Self {
        Self {
            client,
            storage,
            settings,
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    fn file_name(&self, collection: &str) -> String {
        format!("{}.{}", collection, self.settings.format.extension())
    }

    async fn export_collection(&self, collection: &Collection) -> Result<usize> {
        let file_name = self.file_name(&collection.name);
        let per_page = self.settings.per_page();
        let mut page = 1u32;
        let mut written = 0usize;
        let mut items: Vec<Record> = Vec::new();

        if self.settings.format == ExportFormat::Ndjson {
            self.storage.write_file(&file_name, b"").await?;
        }

        loop {
            let result = self
                .client
                .list_records(&collection.name, &RecordQuery::page(page, per_page))
                .await?;
            if result.items.is_empty() {
                break;
            }

            written += result.items.len();
            match self.settings.format {
                ExportFormat::Ndjson => {
                    let mut chunk = Vec::new();
                    for item in &result.items {
                        serde_json::to_writer(&mut chunk, item)?;
                        chunk.push(b'\n');
                    }
                    self.storage.append_file(&file_name, &chunk).await?;
                }
                ExportFormat::Json => items.extend(result.items),
            }

            tracing::debug!(
                "{}: page {} done, {} records so far",
                collection.name,
                page,
                written
            );
            if result.total_items > 0 && written as i64 >= result.total_items {
                break;
            }
            page += 1;
        }

        if self.settings.format == ExportFormat::Json {
            let document = ExportDocument {
                collection: collection.name.clone(),
                exported_at: collection.updated.clone(),
                items,
            };
            let data = serde_json::to_vec_pretty(&document)?;
            self.storage.write_file(&file_name, &data).await?;
        }

        Ok(written)
    }

    async fn write_archive(&self, file_names: &[String]) -> Result<()> {
        let mut entries = Vec::with_capacity(file_names.len());
        for name in file_names {
            let data = self.storage.read_file(name).await?;
            entries.push((name.clone(), data));
        }

        let archive = build_archive(&entries)?;
        tracing::debug!("Writing {} ({} bytes)", ARCHIVE_FILE, archive.len());
        self.storage.write_file(ARCHIVE_FILE, &archive).await
    }
}

fn build_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?.into_inner())
}

#[async_trait]
impl<S: Storage> Pipeline for ExportPipeline<S> {
    type Plan = Vec<Collection>;

    fn name(&self) -> &str {
        "PocketBase export"
    }

    async fn prepare(&self) -> Result<Self::Plan> {
        if let Some(credentials) = &self.settings.credentials {
            self.client.authenticate_admin(credentials).await?;
        }

        let collections = self.settings.selection.select(self.client.list_collections().await?);
        if collections.is_empty() {
            return Err(KitError::ValidationError {
                message: "No collections selected for export".to_string(),
            });
        }

        tracing::info!(
            "📋 Exporting {} collections as {}",
            collections.len(),
            self.settings.format
        );
        Ok(collections)
    }

    async fn execute(&self, plan: Self::Plan) -> Result<RunReport> {
        let mut reports = Vec::with_capacity(plan.len());
        let mut manifest = Vec::with_capacity(plan.len());
        let mut file_names = Vec::with_capacity(plan.len() + 1);

        for collection in &plan {
            let count = self.export_collection(collection).await?;
            tracing::info!("Exported {}: {} records", collection.name, count);

            file_names.push(self.file_name(&collection.name));
            manifest.push(ManifestEntry {
                collection: collection.name.clone(),
                records: count,
            });
            reports.push(CollectionReport {
                collection: collection.name.clone(),
                total: count,
                succeeded: count,
                ..Default::default()
            });
        }

        if !manifest.is_empty() {
            let data = serde_json::to_vec_pretty(&manifest)?;
            self.storage.write_file(MANIFEST_FILE, &data).await?;
            file_names.push(MANIFEST_FILE.to_string());
        }

        let output = if self.settings.bundle_zip {
            self.write_archive(&file_names).await?;
            self.storage.location(ARCHIVE_FILE)
        } else {
            self.storage.location(MANIFEST_FILE)
        };
        tracing::info!(
            "📁 Completed export to {}",
            self.settings.output_dir.display()
        );

        Ok(RunReport {
            pipeline: self.name().to_string(),
            collections: reports,
            output_path: Some(PathBuf::from(output)),
            finished_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, RetryPolicy};
    use crate::core::selection::CollectionSelection;
    use crate::domain::model::AdminCredentials;
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }

        async fn get_json(&self, path: &str) -> Value {
            serde_json::from_slice(&self.get_file(path).await.unwrap()).unwrap()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).await.ok_or_else(|| {
                KitError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .entry(path.to_string())
                .or_default()
                .extend_from_slice(data);
            Ok(())
        }

        fn location(&self, path: &str) -> String {
            format!("mock://{}", path)
        }
    }

    fn client_for(server: &MockServer) -> Arc<PocketBaseClient> {
        let config = ClientConfig::new(server.base_url()).with_retry(RetryPolicy::immediate(3));
        Arc::new(PocketBaseClient::new(config).unwrap())
    }

    fn mock_collections(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/collections");
            then.status(200).json_body(json!({
                "page": 1,
                "totalItems": 3,
                "items": [
                    {"id": "c1", "name": "posts", "type": "base", "updated": "2024-05-01 10:00:00.000Z"},
                    {"id": "c2", "name": "_superusers", "type": "auth", "system": true},
                    {"id": "c3", "name": "comments", "type": "base", "updated": "2024-05-02 10:00:00.000Z"}
                ]
            }));
        });
    }

    #[tokio::test]
    async fn test_json_export_writes_documents_and_manifest() {
        let server = MockServer::start();
        mock_collections(&server);
        server.mock(|when, then| {
            when.method(GET).path("/api/collections/posts/records").query_param("page", "1");
            then.status(200).json_body(json!({
                "page": 1,
                "totalItems": 2,
                "items": [{"id": "p1", "title": "a"}, {"id": "p2", "title": "b"}]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/collections/comments/records").query_param("page", "1");
            then.status(200).json_body(json!({"page": 1, "totalItems": 0, "items": []}));
        });

        let storage = MockStorage::default();
        let pipeline = ExportPipeline::new(client_for(&server), storage.clone(), ExportSettings::default());

        let plan = pipeline.prepare().await.unwrap();
        let names: Vec<&str> = plan.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["comments", "posts"]);

        let report = pipeline.execute(plan).await.unwrap();
        assert_eq!(report.total_records(), 2);
        assert_eq!(report.output_path, Some(PathBuf::from("mock://manifest.json")));

        let posts = storage.get_json("posts.json").await;
        assert_eq!(posts["collection"], "posts");
        assert_eq!(posts["exportedAt"], "2024-05-01 10:00:00.000Z");
        assert_eq!(posts["items"][1]["id"], "p2");

        let comments = storage.get_json("comments.json").await;
        assert!(comments["items"].as_array().unwrap().is_empty());

        let manifest = storage.get_json(MANIFEST_FILE).await;
        assert_eq!(
            manifest,
            json!([
                {"collection": "comments", "records": 0},
                {"collection": "posts", "records": 2}
            ])
        );
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_completion_log_names_output_dir() {
        let server = MockServer::start();
        mock_collections(&server);
        server.mock(|when, then| {
            when.method(GET).path("/api/collections/comments/records");
            then.status(200).json_body(json!({"page": 1, "totalItems": 0, "items": []}));
        });

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let settings = ExportSettings {
            output_dir: PathBuf::from("exports/nightly"),
            selection: CollectionSelection::from_lists(&["comments"], &[], false),
            ..Default::default()
        };
        let pipeline = ExportPipeline::new(client_for(&server), MockStorage::default(), settings);
        let plan = pipeline.prepare().await.unwrap();
        pipeline.execute(plan).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Completed export to exports/nightly"));
        assert!(!output.contains("mock://manifest.json"));
    }

    #[tokio::test]
    async fn test_ndjson_export_pages_until_total() {
        let server = MockServer::start();
        mock_collections(&server);
        let page_one = server.mock(|when, then| {
            when.method(GET)
                .path("/api/collections/posts/records")
                .query_param("page", "1")
                .query_param("perPage", "2");
            then.status(200).json_body(json!({
                "page": 1,
                "totalItems": 3,
                "items": [{"id": "p1"}, {"id": "p2"}]
            }));
        });
        let page_two = server.mock(|when, then| {
            when.method(GET)
                .path("/api/collections/posts/records")
                .query_param("page", "2")
                .query_param("perPage", "2");
            then.status(200)
                .json_body(json!({"page": 2, "totalItems": 3, "items": [{"id": "p3"}]}));
        });

        let storage = MockStorage::default();
        let settings = ExportSettings {
            selection: CollectionSelection::from_lists(&["posts"], &[], false),
            batch_size: 2,
            format: ExportFormat::Ndjson,
            ..Default::default()
        };
        let pipeline = ExportPipeline::new(client_for(&server), storage.clone(), settings);

        let plan = pipeline.prepare().await.unwrap();
        pipeline.execute(plan).await.unwrap();

        page_one.assert();
        page_two.assert();
        let data = String::from_utf8(storage.get_file("posts.ndjson").await.unwrap()).unwrap();
        assert_eq!(data, "{\"id\":\"p1\"}\n{\"id\":\"p2\"}\n{\"id\":\"p3\"}\n");
    }

    #[tokio::test]
    async fn test_prepare_fails_when_nothing_selected() {
        let server = MockServer::start();
        mock_collections(&server);

        let settings = ExportSettings {
            selection: CollectionSelection::from_lists(&["missing"], &[], false),
            ..Default::default()
        };
        let pipeline = ExportPipeline::new(client_for(&server), MockStorage::default(), settings);

        let err = pipeline.prepare().await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: No collections selected for export");
    }

    #[tokio::test]
    async fn test_prepare_authenticates_admin_first() {
        let server = MockServer::start();
        let auth_mock = server.mock(|when, then| {
            when.method(POST).path("/api/admins/auth-with-password");
            then.status(200).json_body(json!({"token": "admin-token"}));
        });
        let list_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/collections")
                .header("Authorization", "Bearer admin-token");
            then.status(200)
                .json_body(json!({"page": 1, "totalItems": 1, "items": [{"name": "posts"}]}));
        });

        let settings = ExportSettings {
            credentials: Some(AdminCredentials {
                email: "admin@example.com".to_string(),
                password: "secret".to_string(),
            }),
            ..Default::default()
        };
        let pipeline = ExportPipeline::new(client_for(&server), MockStorage::default(), settings);

        let plan = pipeline.prepare().await.unwrap();

        auth_mock.assert();
        list_mock.assert();
        assert_eq!(plan.len(), 1);
    }

    #[tokio::test]
    async fn test_bundle_zip_contains_every_file() {
        let server = MockServer::start();
        mock_collections(&server);
        server.mock(|when, then| {
            when.method(GET).path_contains("/records");
            then.status(200)
                .json_body(json!({"page": 1, "totalItems": 1, "items": [{"id": "x1"}]}));
        });

        let storage = MockStorage::default();
        let settings = ExportSettings {
            bundle_zip: true,
            ..Default::default()
        };
        let pipeline = ExportPipeline::new(client_for(&server), storage.clone(), settings);

        let plan = pipeline.prepare().await.unwrap();
        let report = pipeline.execute(plan).await.unwrap();
        assert_eq!(report.output_path, Some(PathBuf::from("mock://export.zip")));

        let archive = storage.get_file(ARCHIVE_FILE).await.unwrap();
        let zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).unwrap();
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["comments.json", "manifest.json", "posts.json"]);
    }
}

use crate::core::selection::CollectionSelection;
use crate::core::upsert::UpsertMap;
use crate::domain::model::{AdminCredentials, ExportFormat};
use crate::utils::error::Result;
use crate::utils::validation::{validate_collection_name, validate_path, Validate};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EXPORT_DIR: &str = "pocketbase_export";
pub const DEFAULT_EXPORT_BATCH_SIZE: usize = 200;
pub const DEFAULT_IMPORT_BATCH_SIZE: usize = 100;
pub const DEFAULT_IMPORT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub credentials: Option<AdminCredentials>,
    pub selection: CollectionSelection,
    /// Records per page request. Values below 1 are treated as 1.
    pub batch_size: usize,
    pub format: ExportFormat,
    /// Also bundle the written files into `export.zip`.
    pub bundle_zip: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            credentials: None,
            selection: CollectionSelection::default(),
            batch_size: DEFAULT_EXPORT_BATCH_SIZE,
            format: ExportFormat::Json,
            bundle_zip: false,
        }
    }
}

impl ExportSettings {
    pub fn per_page(&self) -> u32 {
        u32::try_from(self.batch_size.max(1)).unwrap_or(u32::MAX)
    }
}

impl Validate for ExportSettings {
    fn validate(&self) -> Result<()> {
        validate_path("output_dir", &self.output_dir.to_string_lossy())?;
        validate_selection(&self.selection)
    }
}

#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub input_path: PathBuf,
    pub credentials: Option<AdminCredentials>,
    pub selection: CollectionSelection,
    pub upsert: UpsertMap,
    /// Records per batch. Values below 1 are treated as 1.
    pub batch_size: usize,
    /// Requests in flight within a batch. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Pause after each batch.
    pub throttle: Duration,
    pub dry_run: bool,
    pub skip_missing: bool,
}

impl ImportSettings {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            credentials: None,
            selection: CollectionSelection::default(),
            upsert: UpsertMap::default(),
            batch_size: DEFAULT_IMPORT_BATCH_SIZE,
            concurrency: DEFAULT_IMPORT_CONCURRENCY,
            throttle: Duration::ZERO,
            dry_run: false,
            skip_missing: false,
        }
    }
}

impl Validate for ImportSettings {
    fn validate(&self) -> Result<()> {
        validate_path("input_path", &self.input_path.to_string_lossy())?;
        validate_selection(&self.selection)?;
        for collection in self.upsert.collections() {
            if collection != crate::core::upsert::WILDCARD {
                validate_collection_name("upsert", collection)?;
            }
        }
        Ok(())
    }
}

fn validate_selection(selection: &CollectionSelection) -> Result<()> {
    for name in selection.include.iter() {
        validate_collection_name("collections", name)?;
    }
    for name in selection.exclude.iter() {
        validate_collection_name("exclude", name)?;
    }
    Ok(())
}

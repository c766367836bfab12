use super::{admin_credentials, client_config, print_report};
use crate::adapters::LocalStorage;
use crate::client::PocketBaseClient;
use crate::config::cli::ExportArgs;
use crate::config::settings::{ExportSettings, DEFAULT_EXPORT_BATCH_SIZE, DEFAULT_EXPORT_DIR};
use crate::config::KitConfig;
use crate::core::etl::EtlEngine;
use crate::core::export_pipeline::ExportPipeline;
use crate::core::selection::{parse_name_list, CollectionSelection};
use crate::domain::model::RunReport;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::path::PathBuf;
use std::sync::Arc;

pub fn settings(args: &ExportArgs, config: &KitConfig) -> Result<ExportSettings> {
    let file = &config.export;
    let include = args
        .collections
        .as_deref()
        .map(parse_name_list)
        .unwrap_or_else(|| file.collections.clone());
    let exclude = args
        .exclude
        .as_deref()
        .map(parse_name_list)
        .unwrap_or_else(|| file.exclude.clone());
    let include_system = args.include_system || file.include_system.unwrap_or(false);

    let settings = ExportSettings {
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| file.output_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
        credentials: admin_credentials(&args.connection, config)?,
        selection: CollectionSelection::from_lists(&include, &exclude, include_system),
        batch_size: args
            .batch_size
            .or(file.batch_size)
            .unwrap_or(DEFAULT_EXPORT_BATCH_SIZE),
        format: match args.format {
            Some(format) => format,
            None => config.export_format()?.unwrap_or_default(),
        },
        bundle_zip: args.zip || file.zip.unwrap_or(false),
    };
    settings.validate()?;
    Ok(settings)
}

pub async fn execute(args: ExportArgs, config: KitConfig, monitor: bool) -> Result<RunReport> {
    let settings = settings(&args, &config)?;
    let client = Arc::new(PocketBaseClient::new(client_config(
        args.connection.url.as_deref(),
        &config,
    ))?);
    tracing::info!(
        "Exporting from {} into {}",
        client.base_url(),
        settings.output_dir.display()
    );

    let storage = LocalStorage::new(settings.output_dir.clone());
    let engine = EtlEngine::new_with_monitoring(ExportPipeline::new(client, storage, settings), monitor);
    let report = engine.run().await?;
    print_report(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::ConnectionArgs;
    use crate::domain::model::ExportFormat;

    fn args() -> ExportArgs {
        ExportArgs {
            connection: ConnectionArgs::default(),
            output_dir: None,
            collections: None,
            exclude: None,
            include_system: false,
            batch_size: None,
            format: None,
            zip: false,
        }
    }

    #[test]
    fn test_defaults_without_flags_or_file() {
        let settings = settings(&args(), &KitConfig::default()).unwrap();

        assert_eq!(settings.output_dir, PathBuf::from("pocketbase_export"));
        assert_eq!(settings.batch_size, 200);
        assert_eq!(settings.format, ExportFormat::Json);
        assert!(settings.credentials.is_none());
        assert!(!settings.bundle_zip);
    }

    #[test]
    fn test_flags_override_file() {
        let config = KitConfig::from_toml_str(
            "[export]\noutput_dir = \"./file-dir\"\ncollections = [\"users\"]\nformat = \"ndjson\"\nbatch_size = 50\n",
        )
        .unwrap();
        let mut args = args();
        args.collections = Some(" posts , comments ,".to_string());
        args.format = Some(ExportFormat::Json);

        let settings = settings(&args, &config).unwrap();

        assert_eq!(settings.output_dir, PathBuf::from("./file-dir"));
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.format, ExportFormat::Json);
        assert!(settings.selection.allows_name("posts"));
        assert!(settings.selection.allows_name("comments"));
        assert!(!settings.selection.allows_name("users"));
    }
}

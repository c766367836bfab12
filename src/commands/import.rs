use super::{admin_credentials, client_config, print_report};
use crate::client::PocketBaseClient;
use crate::config::cli::ImportArgs;
use crate::config::settings::ImportSettings;
use crate::config::KitConfig;
use crate::core::etl::EtlEngine;
use crate::core::import_pipeline::ImportPipeline;
use crate::core::selection::{parse_name_list, CollectionSelection};
use crate::core::upsert::UpsertMap;
use crate::domain::model::RunReport;
use crate::utils::error::{KitError, Result};
use crate::utils::validation::Validate;
use std::sync::Arc;
use std::time::Duration;

pub fn settings(args: &ImportArgs, config: &KitConfig) -> Result<ImportSettings> {
    let file = &config.import;
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
    let upsert = if args.upsert.is_empty() {
        UpsertMap::parse(&file.upsert)?
    } else {
        UpsertMap::parse(&args.upsert)?
    };

    let throttle_seconds = args.throttle.or(file.throttle_seconds).unwrap_or(0.0);
    let throttle = Duration::try_from_secs_f64(throttle_seconds).map_err(|_| {
        KitError::InvalidConfigValueError {
            field: "throttle".to_string(),
            value: throttle_seconds.to_string(),
            reason: "must be zero or a positive number of seconds".to_string(),
        }
    })?;

    let mut settings = ImportSettings::new(args.input_path.clone());
    settings.credentials = admin_credentials(&args.connection, config)?;
    settings.selection = CollectionSelection::from_lists(&include, &exclude, false);
    settings.upsert = upsert;
    settings.throttle = throttle;
    settings.dry_run = args.dry_run;
    settings.skip_missing = args.skip_missing || file.skip_missing.unwrap_or(false);
    if let Some(batch_size) = args.batch_size.or(file.batch_size) {
        settings.batch_size = batch_size;
    }
    if let Some(concurrency) = args.concurrency.or(file.concurrency) {
        settings.concurrency = concurrency;
    }

    settings.validate()?;
    Ok(settings)
}

pub async fn execute(args: ImportArgs, config: KitConfig, monitor: bool) -> Result<RunReport> {
    let settings = settings(&args, &config)?;
    let client = Arc::new(PocketBaseClient::new(client_config(
        args.connection.url.as_deref(),
        &config,
    ))?);
    tracing::info!(
        "Importing {} into {}",
        settings.input_path.display(),
        client.base_url()
    );

    let engine = EtlEngine::new_with_monitoring(ImportPipeline::new(client, settings), monitor);
    let report = engine.run().await?;
    print_report(&report);
    Ok(report)
}

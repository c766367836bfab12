//! `pbkit` subcommands. Each module exposes `execute(args, config)`.

pub mod auth;
pub mod docker;
pub mod export;
pub mod home;
pub mod import;

use crate::client::urls::{ServiceUrls, DEFAULT_URL};
use crate::client::ClientConfig;
use crate::config::cli::ConnectionArgs;
use crate::config::KitConfig;
use crate::domain::model::{AdminCredentials, RunReport};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::path::Path;

/// The file named on the command line, else `./pbkit.toml` if it exists.
pub fn load_config(path: Option<&Path>) -> Result<KitConfig> {
    let config = match path {
        Some(path) => {
            tracing::info!("📁 Loading configuration from {}", path.display());
            KitConfig::from_file(path)?
        }
        None => KitConfig::load_default()?,
    };
    config.validate()?;
    Ok(config)
}

/// Base URL precedence: flag or `POCKETBASE_URL`, config file,
/// `PUBLIC_POCKETBASE_URL`, then the local default.
pub fn client_config(url: Option<&str>, config: &KitConfig) -> ClientConfig {
    let env_urls = ServiceUrls::from_env();
    let base_url = url
        .or(config.server.url.as_deref())
        .or(env_urls.internal())
        .unwrap_or(DEFAULT_URL);

    let mut client_config = ClientConfig::new(base_url).with_retry(config.retry_policy());
    if let Some(collection) = &config.server.auth_collection {
        client_config = client_config.with_auth_collection(collection.clone());
    }
    if let Some(timeout) = config.timeout() {
        client_config = client_config.with_timeout(timeout);
    }
    client_config
}

/// Admin credentials from flags, env or config. No email means no admin
/// authentication; an email without a password prompts for it.
pub fn admin_credentials(
    connection: &ConnectionArgs,
    config: &KitConfig,
) -> Result<Option<AdminCredentials>> {
    let Some(email) = connection.email.clone().or_else(|| config.admin.email.clone()) else {
        return Ok(None);
    };
    let password = match connection.password.clone().or_else(|| config.admin.password.clone()) {
        Some(password) => password,
        None => prompt_secret("Admin password: ")?,
    };
    Ok(Some(AdminCredentials { email, password }))
}

pub fn prompt_secret(prompt: &str) -> Result<String> {
    Ok(rpassword::prompt_password(prompt)?)
}

pub fn print_report(report: &RunReport) {
    match report.finished_at {
        Some(at) => println!(
            "✅ {} completed at {}",
            report.pipeline,
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("✅ {} completed", report.pipeline),
    }
    for collection in &report.collections {
        match &collection.skipped {
            Some(reason) => println!("  {}: skipped ({})", collection.collection, reason),
            None => println!(
                "  {}: {}/{} records",
                collection.collection, collection.succeeded, collection.total
            ),
        }
    }
    if report.total_failed() > 0 {
        println!("⚠️  {} records failed", report.total_failed());
    }
    if let Some(path) = &report.output_path {
        println!("📁 Output saved to: {}", path.display());
    }
}

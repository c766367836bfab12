use crate::client::RetryPolicy;
use crate::domain::model::ExportFormat;
use crate::utils::error::{KitError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "pbkit.toml";

/// Contents of `pbkit.toml`. Every section and key is optional; command-line
/// flags take precedence over anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub export: ExportConfig,
    pub import: ImportConfig,
    pub retry: RetryConfig,
    pub docker: DockerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub auth_collection: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: Option<String>,
    pub collections: Vec<String>,
    pub exclude: Vec<String>,
    pub include_system: Option<bool>,
    pub batch_size: Option<usize>,
    pub format: Option<String>,
    pub zip: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub collections: Vec<String>,
    pub exclude: Vec<String>,
    pub upsert: Vec<String>,
    pub batch_size: Option<usize>,
    pub concurrency: Option<usize>,
    pub throttle_seconds: Option<f64>,
    pub skip_missing: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub container_name: Option<String>,
    pub image: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<String>,
}

impl KitConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// `pbkit.toml` in the working directory if present, else defaults.
    pub fn load_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            tracing::debug!("Loading {}", DEFAULT_CONFIG_FILE);
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        toml::from_str(&processed).map_err(|e| KitError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.retry.max_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff: self
                .retry
                .initial_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
            max_backoff: self
                .retry
                .max_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_backoff),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.server.timeout_seconds.map(Duration::from_secs)
    }

    pub fn export_format(&self) -> Result<Option<ExportFormat>> {
        self.export
            .format
            .as_deref()
            .map(|raw| {
                raw.parse().map_err(|reason| KitError::InvalidConfigValueError {
                    field: "export.format".to_string(),
                    value: raw.to_string(),
                    reason,
                })
            })
            .transpose()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(url) = &self.server.url {
            validate_url("server.url", url)?;
        }
        if let Some(collection) = &self.server.auth_collection {
            validate_non_empty_string("server.auth_collection", collection)?;
        }
        if self.admin.password.is_some() && self.admin.email.is_none() {
            return Err(KitError::MissingConfigError {
                field: "admin.email".to_string(),
            });
        }
        if let Some(batch_size) = self.export.batch_size {
            validate_positive_number("export.batch_size", batch_size, 1)?;
        }
        if let Some(batch_size) = self.import.batch_size {
            validate_positive_number("import.batch_size", batch_size, 1)?;
        }
        if let Some(concurrency) = self.import.concurrency {
            validate_positive_number("import.concurrency", concurrency, 1)?;
        }
        if let Some(throttle) = self.import.throttle_seconds {
            if !throttle.is_finite() || throttle < 0.0 {
                return Err(KitError::InvalidConfigValueError {
                    field: "import.throttle_seconds".to_string(),
                    value: throttle.to_string(),
                    reason: "must be zero or a positive number of seconds".to_string(),
                });
            }
        }
        if let Some(attempts) = self.retry.max_attempts {
            validate_positive_number("retry.max_attempts", attempts as usize, 1)?;
        }
        self.export_format()?;
        Ok(())
    }
}

impl Validate for KitConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Replaces `${VAR}` with the variable's value; unknown variables are left
/// as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| KitError::ConfigError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });
    Ok(result.into_owned())
}

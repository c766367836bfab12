use crate::domain::ports::{CommandOutput, CommandRunner};
use crate::utils::error::{KitError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONTAINER_NAME: &str = "pocketbase";
pub const DEFAULT_IMAGE: &str = "ghcr.io/muchobien/pocketbase:latest";
pub const DEFAULT_HOST_PORT: u16 = 8090;
pub const DEFAULT_DATA_DIR: &str = "./pb_data";
/// Port PocketBase listens on inside the container.
pub const CONTAINER_PORT: u16 = 8090;
/// Mount point of the data directory inside the container.
pub const CONTAINER_DATA_DIR: &str = "/pb_data";

const DOCKER: &str = "docker";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyRunning,
    Started { container_id: String },
}

/// Starts a single PocketBase container.
#[derive(Debug, Clone)]
pub struct DockerBootstrap<R: CommandRunner> {
    runner: R,
    pub container_name: String,
    pub image: String,
    pub host_port: u16,
    pub data_dir: PathBuf,
}

impl<R: CommandRunner> DockerBootstrap<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            host_port: DEFAULT_HOST_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = name.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_host_port(mut self, port: u16) -> Self {
        self.host_port = port;
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub async fn run(&self) -> Result<BootstrapOutcome> {
        self.validate()?;

        let version = self.docker(&["--version".to_string()]).await?;
        if !version.success {
            return Err(KitError::DockerError {
                message: format!("`docker --version` failed: {}", version.stderr),
            });
        }
        tracing::debug!("{}", version.stdout);

        if self.is_running().await? {
            tracing::info!("Container {} is already running", self.container_name);
            return Ok(BootstrapOutcome::AlreadyRunning);
        }

        tokio::fs::create_dir_all(&self.data_dir).await?;
        // A relative host path would be taken as a named volume.
        let host_dir = tokio::fs::canonicalize(&self.data_dir).await?;

        let started = self.docker(&self.run_args(&host_dir)).await?;
        if !started.success {
            return Err(KitError::DockerError {
                message: format!(
                    "Failed to start container {}: {}",
                    self.container_name, started.stderr
                ),
            });
        }

        tracing::info!(
            "🐳 Started {} ({}) on port {}",
            self.container_name,
            self.image,
            self.host_port
        );
        Ok(BootstrapOutcome::Started {
            container_id: started.stdout,
        })
    }

    async fn is_running(&self) -> Result<bool> {
        let args = [
            "ps".to_string(),
            "--filter".to_string(),
            format!("name=^/{}$", self.container_name),
            "--format".to_string(),
            "{{.Names}}".to_string(),
        ];
        let output = self.docker(&args).await?;
        if !output.success {
            return Err(KitError::DockerError {
                message: format!("`docker ps` failed: {}", output.stderr),
            });
        }
        Ok(output
            .stdout
            .lines()
            .any(|line| line.trim() == self.container_name))
    }

    fn run_args(&self, host_dir: &Path) -> Vec<String> {
        vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.container_name.clone(),
            "-p".to_string(),
            format!("{}:{}", self.host_port, CONTAINER_PORT),
            "-v".to_string(),
            format!("{}:{}", host_dir.display(), CONTAINER_DATA_DIR),
            self.image.clone(),
        ]
    }

    async fn docker(&self, args: &[String]) -> Result<CommandOutput> {
        self.runner
            .run(DOCKER, args)
            .await
            .map_err(|e| KitError::DockerError {
                message: format!("Could not run docker: {}", e),
            })
    }
}

impl<R: CommandRunner> Validate for DockerBootstrap<R> {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("container_name", &self.container_name)?;
        validate_non_empty_string("image", &self.image)?;
        validate_path("data_dir", &self.data_dir.to_string_lossy())?;
        if self.host_port == 0 {
            return Err(KitError::InvalidConfigValueError {
                field: "host_port".to_string(),
                value: "0".to_string(),
                reason: "Port must be between 1 and 65535".to_string(),
            });
        }
        Ok(())
    }
}

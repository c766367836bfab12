use crate::adapters::SystemCommandRunner;
use crate::bootstrap::{BootstrapOutcome, DockerBootstrap};
use crate::config::cli::DockerArgs;
use crate::config::KitConfig;
use crate::utils::error::Result;

pub async fn execute(args: DockerArgs, config: KitConfig) -> Result<BootstrapOutcome> {
    let bootstrap = bootstrap(args, &config, SystemCommandRunner);
    let outcome = bootstrap.run().await?;

    match &outcome {
        BootstrapOutcome::AlreadyRunning => {
            println!("✅ Container {} is already running", bootstrap.container_name)
        }
        BootstrapOutcome::Started { container_id } => {
            println!(
                "✅ Started {} ({})",
                bootstrap.container_name,
                short_id(container_id)
            );
            println!("🌐 PocketBase: http://127.0.0.1:{}", bootstrap.host_port);
            println!("🛠️  Admin UI:   http://127.0.0.1:{}/_/", bootstrap.host_port);
        }
    }
    Ok(outcome)
}

/// Flags win over the `[docker]` section; unset values keep the defaults.
pub fn bootstrap<R: crate::domain::ports::CommandRunner>(
    args: DockerArgs,
    config: &KitConfig,
    runner: R,
) -> DockerBootstrap<R> {
    let file = &config.docker;
    let mut bootstrap = DockerBootstrap::new(runner);
    if let Some(name) = args.name.or_else(|| file.container_name.clone()) {
        bootstrap = bootstrap.with_container_name(name);
    }
    if let Some(image) = args.image.or_else(|| file.image.clone()) {
        bootstrap = bootstrap.with_image(image);
    }
    if let Some(port) = args.port.or(file.port) {
        bootstrap = bootstrap.with_host_port(port);
    }
    if let Some(data_dir) = args.data_dir.or_else(|| file.data_dir.clone().map(Into::into)) {
        bootstrap = bootstrap.with_data_dir(data_dir);
    }
    bootstrap
}

fn short_id(container_id: &str) -> &str {
    container_id.get(..12).unwrap_or(container_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::docker::{DEFAULT_IMAGE, DEFAULT_CONTAINER_NAME};
    use std::path::PathBuf;

    #[test]
    fn test_flags_then_file_then_defaults() {
        let config = KitConfig::from_toml_str(
            "[docker]\ncontainer_name = \"pb-file\"\nport = 9000\ndata_dir = \"./file-data\"\n",
        )
        .unwrap();
        let args = DockerArgs {
            port: Some(9100),
            ..Default::default()
        };

        let bootstrap = bootstrap(args, &config, SystemCommandRunner);

        assert_eq!(bootstrap.container_name, "pb-file");
        assert_eq!(bootstrap.host_port, 9100);
        assert_eq!(bootstrap.image, DEFAULT_IMAGE);
        assert_eq!(bootstrap.data_dir, PathBuf::from("./file-data"));

        let defaults = super::bootstrap(DockerArgs::default(), &KitConfig::default(), SystemCommandRunner);
        assert_eq!(defaults.container_name, DEFAULT_CONTAINER_NAME);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "0123456789ab");
        assert_eq!(short_id("abc"), "abc");
    }
}

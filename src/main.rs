use clap::Parser;
use pocketbase_kit::commands;
use pocketbase_kit::config::cli::{Cli, Commands};
use pocketbase_kit::utils::error::{ErrorSeverity, KitError};
use pocketbase_kit::utils::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ pbkit failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: Cli) -> Result<(), KitError> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Export(args) => {
            commands::export::execute(args, config, cli.monitor).await?;
        }
        Commands::Import(args) => {
            let report = commands::import::execute(args, config, cli.monitor).await?;
            if report.total_failed() > 0 {
                tracing::warn!("{} records failed to import", report.total_failed());
            }
        }
        Commands::Auth(args) => {
            commands::auth::execute(args, config).await?;
        }
        Commands::Docker(args) => {
            commands::docker::execute(args, config).await?;
        }
        Commands::Home(args) => commands::home::execute(args).await?,
        Commands::Route { page } => commands::home::route(&page)?,
    }
    Ok(())
}

//! Command-line arguments of `pbkit`.

use crate::domain::model::ExportFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Starter toolkit for PocketBase apps
#[derive(Parser, Debug)]
#[command(name = "pbkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log CPU and memory usage per stage
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Config file path (defaults to ./pbkit.toml when present)
    #[arg(short, long, global = true, env = "PBKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export collection records to JSON or NDJSON files
    Export(ExportArgs),

    /// Import records from export files
    Import(ImportArgs),

    /// Run an auth operation against the auth collection
    Auth(AuthArgs),

    /// Start a PocketBase container
    Docker(DockerArgs),

    /// Render the static home page
    Home(HomeArgs),

    /// Print the URL path served by a page file
    Route {
        /// Page file, e.g. pages/about/index.html
        page: PathBuf,
    },
}

/// Server and admin account shared by export and import.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// PocketBase base URL
    #[arg(long, env = "POCKETBASE_URL")]
    pub url: Option<String>,

    /// Admin email for authentication
    #[arg(long, env = "PB_ADMIN_EMAIL")]
    pub email: Option<String>,

    /// Admin password (prompted when an email is given without it)
    #[arg(long, env = "PB_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Directory for the export files [default: pocketbase_export]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Comma-separated collections to include
    #[arg(long)]
    pub collections: Option<String>,

    /// Comma-separated collections to skip
    #[arg(long)]
    pub exclude: Option<String>,

    /// Also export system collections
    #[arg(long)]
    pub include_system: bool,

    /// Records per page request [default: 200]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Output format: json or ndjson [default: json]
    #[arg(long)]
    pub format: Option<ExportFormat>,

    /// Bundle the written files into export.zip
    #[arg(long)]
    pub zip: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Export file or directory of export files
    pub input_path: PathBuf,

    /// Comma-separated collections to include
    #[arg(long)]
    pub collections: Option<String>,

    /// Comma-separated collections to skip
    #[arg(long)]
    pub exclude: Option<String>,

    /// collection=field mapping; *=field sets the default (repeatable)
    #[arg(long)]
    pub upsert: Vec<String>,

    /// Records per batch [default: 100]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Concurrent requests per batch [default: 4]
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Seconds to sleep between batches
    #[arg(long)]
    pub throttle: Option<f64>,

    /// Parse files without writing to PocketBase
    #[arg(long)]
    pub dry_run: bool,

    /// Skip files whose collection does not exist
    #[arg(long)]
    pub skip_missing: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
    /// PocketBase base URL
    #[arg(long, env = "POCKETBASE_URL")]
    pub url: Option<String>,

    /// Auth collection [default: users]
    #[arg(long)]
    pub auth_collection: Option<String>,

    #[command(subcommand)]
    pub action: AuthAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthAction {
    /// Sign in with email and password
    SignIn {
        email: String,
        /// Prompted when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    SignUp {
        email: String,
        #[arg(long)]
        password: Option<String>,
        /// Extra record fields as a JSON object
        #[arg(long)]
        data: Option<String>,
    },
    /// Clear the stored session
    SignOut,
    /// Finish an OAuth2 sign-in after the provider redirect
    Oauth {
        provider: String,
        code: String,
        #[arg(long)]
        code_verifier: String,
        #[arg(long)]
        redirect_url: String,
    },
    /// Send a password reset email
    RequestReset { email: String },
    /// Set a new password with a reset token
    ConfirmReset {
        token: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in, then change the password
    UpdatePassword {
        email: String,
        #[arg(long)]
        old_password: Option<String>,
        #[arg(long)]
        new_password: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct DockerArgs {
    /// Container name [default: pocketbase]
    #[arg(long)]
    pub name: Option<String>,

    /// Image to run
    #[arg(long)]
    pub image: Option<String>,

    /// Host port mapped to 8090 [default: 8090]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host directory mounted as /pb_data [default: ./pb_data]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct HomeArgs {
    /// Write the page here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Page heading
    #[arg(long)]
    pub title: Option<String>,
}

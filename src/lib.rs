pub mod adapters;
pub mod bootstrap;
pub mod client;
#[cfg(feature = "cli")]
pub mod commands;
pub mod config;
pub mod core;
pub mod domain;
pub mod site;
pub mod utils;

pub use adapters::{LocalStorage, SystemCommandRunner};
pub use bootstrap::{BootstrapOutcome, DockerBootstrap};
pub use client::{handle, ClientConfig, PocketBaseClient, RetryPolicy};
pub use config::{ExportSettings, ImportSettings, KitConfig};
pub use core::{etl::EtlEngine, export_pipeline::ExportPipeline, import_pipeline::ImportPipeline};
pub use utils::error::{KitError, Result};

#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;
pub mod toml_config;

pub use settings::{ExportSettings, ImportSettings};
pub use toml_config::KitConfig;

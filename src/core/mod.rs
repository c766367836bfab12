pub mod etl;
pub mod export_pipeline;
pub mod import_pipeline;
pub mod records;
pub mod selection;
pub mod upsert;

pub use crate::domain::model::{Record, RunReport};
pub use crate::domain::ports::{CommandRunner, Pipeline, Storage};
pub use crate::utils::error::Result;

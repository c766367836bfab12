//! The process-wide PocketBase client.
//!
//! Initialize once at startup with [`init`]; everything else reads it through
//! [`get`].

use super::{ClientConfig, PocketBaseClient};
use crate::utils::error::{KitError, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

static CLIENT: OnceCell<Arc<PocketBaseClient>> = OnceCell::new();

pub fn init(config: ClientConfig) -> Result<Arc<PocketBaseClient>> {
    let client = Arc::new(PocketBaseClient::new(config)?);
    CLIENT
        .set(client.clone())
        .map_err(|_| KitError::ConfigError {
            message: "PocketBase client is already initialized".to_string(),
        })?;
    tracing::debug!("PocketBase client initialized for {}", client.base_url());
    Ok(client)
}

pub fn get() -> Result<Arc<PocketBaseClient>> {
    CLIENT.get().cloned().ok_or_else(|| KitError::ConfigError {
        message: "PocketBase client is not initialized".to_string(),
    })
}

pub fn is_initialized() -> bool {
    CLIENT.get().is_some()
}

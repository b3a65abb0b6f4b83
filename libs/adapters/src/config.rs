//! Adapter configuration loading.
//!
//! YAML-backed configuration for the source and sink adapters, wrapping the
//! transport factory configs plus the payload charset.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use transport::{ClientConfig, ServerConfig};

use crate::charset::Charset;
use crate::error::AdapterError;

/// Source adapter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Listening factory settings.
    pub server: ServerConfig,
    /// Charset for text views of inbound payloads.
    pub charset: Charset,
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), AdapterError> {
        self.server.validate()?;
        Ok(())
    }
}

/// Sink adapter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Dialing factory settings.
    pub client: ClientConfig,
    /// Charset for encoding outbound text payloads.
    pub charset: Charset,
}

impl SinkConfig {
    pub fn validate(&self) -> Result<(), AdapterError> {
        self.client.validate()?;
        Ok(())
    }
}

/// Load and validate a source configuration from a YAML file.
pub fn load_source_config(path: impl AsRef<Path>) -> Result<SourceConfig, AdapterError> {
    let config: SourceConfig = load_yaml(path.as_ref())?;
    config.validate()?;
    debug!(
        bind = %config.server.bind_addr(),
        encoding = %config.server.encoding,
        "loaded source config"
    );
    Ok(config)
}

/// Load and validate a sink configuration from a YAML file.
pub fn load_sink_config(path: impl AsRef<Path>) -> Result<SinkConfig, AdapterError> {
    let config: SinkConfig = load_yaml(path.as_ref())?;
    config.validate()?;
    debug!(
        remote = %config.client.remote_addr(),
        encoding = %config.client.encoding,
        "loaded sink config"
    );
    Ok(config)
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AdapterError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AdapterError::invalid_config(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_yaml::from_str(&raw).map_err(|e| {
        AdapterError::invalid_config(format!("cannot parse {}: {}", path.display(), e))
    })
}

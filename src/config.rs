//! Configuration
//!
//! Provider credentials come from environment variables, mirroring the usual
//! OPENAI_* conventions. The provider flavor is inferred from the API base
//! URL: a base containing "azure" selects the Azure-hosted endpoint, anything
//! else (including no base at all) selects standard OpenAI.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Could not resolve a data directory for this platform")]
    NoDataDir,
}

/// Which hosted API flavor the settings resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Azure,
}

/// Credentials and model names for the hosted provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub api_base: Option<String>,
    pub api_version: Option<String>,
    /// Model name for OpenAI, deployment name for Azure.
    pub chat_deployment: String,
    pub embedding_deployment: String,
}

impl ProviderSettings {
    /// Read settings from the environment. Only the API key is required;
    /// everything else has a default or is provider-specific.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key =
            env::var("OPENAI_API_KEY").map_err(|_| ConfigError::MissingVar("OPENAI_API_KEY"))?;

        Ok(Self {
            api_key,
            api_base: env::var("OPENAI_API_BASE").ok(),
            api_version: env::var("OPENAI_API_VERSION").ok(),
            chat_deployment: env::var("AZURE_DEPLOYMENT_NAME")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            embedding_deployment: env::var("AZURE_EMBEDDING_DEPLOYMENT_NAME")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        match &self.api_base {
            Some(base) if base.to_lowercase().contains("azure") => ProviderKind::Azure,
            _ => ProviderKind::OpenAi,
        }
    }
}

/// On-disk locations for the vector index and the application registry.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub index_dir: PathBuf,
    pub registry_path: PathBuf,
}

impl DataPaths {
    /// Resolve the data root from MANUALBOT_DATA_DIR, falling back to the
    /// platform data directory.
    pub fn resolve() -> Result<Self, ConfigError> {
        let root = match env::var("MANUALBOT_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join("manualbot"),
        };
        Ok(Self::under(root))
    }

    /// Lay out the standard paths beneath an explicit root.
    pub fn under(root: PathBuf) -> Self {
        Self {
            registry_path: root.join("apps.json"),
            index_dir: root,
        }
    }
}

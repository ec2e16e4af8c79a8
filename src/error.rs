use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Failed to load coverage artifact '{}'", path.display())]
    ArtifactLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to join coverage artifact '{}': {message}", path.display())]
    Merge { path: PathBuf, message: String },

    #[error("Failed to read symbols for module '{module}': {message}")]
    Symbols { module: String, message: String },

    #[error("Failed to write report to '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl ConvertError {
    pub fn artifact_load(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ConvertError::ArtifactLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn symbols(module: &str, message: impl std::fmt::Display) -> Self {
        ConvertError::Symbols {
            module: module.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

//! Error types for mdharvest
//!
//! Two families: [`ConvertError`] covers per-URL failures that the run
//! recovers from by skipping the URL, and [`HarvestError`] covers failures
//! that abort the whole run (bad seeds, filesystem writes).

use std::path::PathBuf;
use thiserror::Error;

/// Per-URL conversion failure
///
/// Any of these means "skip this URL": the orchestrator logs the error,
/// counts it, and continues. None of them ever aborts a run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Request failed to connect or complete
    #[error("request failed: {0}")]
    Request(String),

    /// Request exceeded the per-URL timeout
    #[error("request timed out")]
    Timeout,

    /// Server answered with a non-success status
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// Content type cannot be converted to text
    #[error("binary content is not supported: {0}")]
    BinaryContent(String),

    /// Conversion produced no usable text
    #[error("document converted to empty content")]
    EmptyDocument,
}

impl ConvertError {
    /// Classify a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConvertError::Timeout
        } else {
            ConvertError::Request(err.to_string())
        }
    }
}

/// Run-fatal failure
#[derive(Debug, Error)]
pub enum HarvestError {
    /// A seed URL could not be parsed
    #[error("invalid seed URL '{url}'")]
    InvalidSeed {
        /// The offending seed as given by the caller
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A seed URL has an unsupported scheme
    #[error("seed URL '{0}' must start with http:// or https://")]
    InvalidSeedScheme(String),

    /// Output directory could not be created
    #[error("failed to create output directory {}", path.display())]
    CreateOutputDir {
        /// Directory that could not be created
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sealed unit could not be written to disk
    #[error("failed to write output file {}", path.display())]
    WriteUnit {
        /// Destination path of the failed write
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be written
    #[error("failed to write manifest {}", path.display())]
    WriteManifest {
        /// Destination path of the manifest
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

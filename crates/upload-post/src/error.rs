//! Error type for resolving and dispatching Upload-Post requests.

use node_api::{FailureKind, HostError};
use thiserror::Error;

use crate::models::{Operation, Platform};

/// Everything that can go wrong while turning one item into an API call.
#[derive(Debug, Error)]
pub enum UploadPostError {
    // ------ Configuration errors (raised before any request is sent) ------

    /// The credential exists but carries no API key.
    #[error("API key is missing from the Upload-Post credentials")]
    MissingApiKey,

    /// The `operation` parameter names no known operation.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// A `platform` entry names no known platform.
    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),

    /// A required parameter is absent or empty.
    #[error("parameter '{parameter}' is required{}", for_platform(.platform))]
    MissingParameter {
        parameter: &'static str,
        platform: Option<Platform>,
    },

    /// None of the selected platforms accept this operation.
    #[error("none of the selected platforms support {operation}")]
    NoSupportedPlatforms { operation: Operation },

    /// A photo or video operation without any media.
    #[error("{operation} requires at least one value in '{parameter}'")]
    MissingMedia {
        operation: Operation,
        parameter: &'static str,
    },

    /// A parameter has the wrong type or an out-of-range value.
    #[error("invalid value for parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    // ------ Transport errors ------

    /// Network failure or client construction failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Upload-Post API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered 2xx but the body was not JSON.
    #[error("failed to decode Upload-Post response: {0}")]
    Decode(#[source] serde_json::Error),

    /// A binary attachment ended up in a JSON-encoded body.
    #[error("field '{0}' carries binary content but the request body is JSON")]
    BinaryInJsonBody(String),

    // ------ Host errors ------

    /// A binary media reference reached the dispatcher without content.
    #[error("field '{field}' still refers to binary property '{property}'")]
    UnresolvedMedia { field: String, property: String },

    /// The host failed to supply a credential or an attachment.
    #[error(transparent)]
    Host(#[from] HostError),
}

fn for_platform(platform: &Option<Platform>) -> String {
    platform
        .map(|p| format!(" when '{p}' is selected"))
        .unwrap_or_default()
}

/// Coarse error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Host,
}

impl UploadPostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingApiKey
            | Self::UnknownOperation(_)
            | Self::UnknownPlatform(_)
            | Self::MissingParameter { .. }
            | Self::NoSupportedPlatforms { .. }
            | Self::MissingMedia { .. }
            | Self::InvalidParameter { .. } => ErrorKind::Configuration,

            Self::Http(_) | Self::Status { .. } | Self::Decode(_) | Self::BinaryInJsonBody(_) => {
                ErrorKind::Transport
            }

            Self::UnresolvedMedia { .. } | Self::Host(_) => ErrorKind::Host,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub(crate) fn invalid(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

impl From<ErrorKind> for FailureKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Configuration => FailureKind::Configuration,
            ErrorKind::Transport => FailureKind::Transport,
            ErrorKind::Host => FailureKind::Host,
        }
    }
}

//! Host- and node-level error types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by the host while serving a node's request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The credential store has no usable entry under this name.
    #[error("credential '{name}' is unavailable: {message}")]
    CredentialUnavailable { name: String, message: String },

    /// The item carries no binary attachment with this property name.
    #[error("item {item_index} has no binary property '{property}'")]
    MissingBinary { item_index: usize, property: String },

    /// The attachment exists but its content could not be loaded.
    #[error("failed to read binary property '{property}': {message}")]
    BinaryRead { property: String, message: String },

    /// The node asked for an item the host does not have.
    #[error("item index {0} is out of range")]
    ItemOutOfRange(usize),
}

/// Coarse classification of an item failure, carried across the host
/// boundary so the host can decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Invalid or missing user input. Detected before any request is sent.
    Configuration,
    /// Network failure, unexpected status or undecodable response.
    Transport,
    /// The host itself failed (credential store, binary resolution).
    Host,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Transport => write!(f, "transport"),
            Self::Host => write!(f, "host"),
        }
    }
}

/// Errors returned by a node's `execute` method.
///
/// Only raised when the run is not in continue-on-fail mode; otherwise
/// failures are reported per item as [`crate::ItemRecord::Error`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Processing of one item failed and the run was aborted.
    #[error("item {item_index} failed ({kind}): {message}")]
    ItemFailed {
        item_index: usize,
        kind: FailureKind,
        message: String,
    },
}

impl NodeError {
    /// Index of the item that aborted the run.
    pub fn item_index(&self) -> usize {
        match self {
            Self::ItemFailed { item_index, .. } => *item_index,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ItemFailed { kind, .. } => *kind,
        }
    }
}

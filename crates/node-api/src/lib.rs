//! `node-api` crate: the contract between a workflow host and its nodes.
//!
//! A node implements [`ExecutableNode`]; the host hands it a [`NodeHost`]
//! through which the node reads per-item parameters, credentials and binary
//! attachments. Nothing here knows about any particular remote service.

pub mod error;
pub mod traits;
pub mod mock;

pub use error::{FailureKind, HostError, NodeError};
pub use traits::{
    BinaryData, Credential, ExecutableNode, ExecutionContext, ItemOutput, ItemRecord, NodeHost,
};

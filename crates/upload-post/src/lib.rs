//! `upload-post` crate: a workflow node that publishes photos, video and
//! text to social platforms through the Upload-Post API.
//!
//! The [`resolver`] turns one item's parameters into a [`ResolvedRequest`]
//! using the per-platform [`rules`] table; the [`client`] sends it.
//! [`UploadPostNode`] runs both for every item a host provides.

pub mod models;
pub mod error;
pub mod params;
pub mod rules;
pub mod resolver;
pub mod schema;
pub mod config;
pub mod client;
pub mod node;

pub use models::{MediaReference, Operation, PayloadValue, Platform, RequestPayload, ResolvedRequest};
pub use error::{ErrorKind, UploadPostError};
pub use params::ParameterBag;
pub use resolver::{resolve, resolve_parameters};
pub use config::ClientConfig;
pub use client::UploadPostClient;
pub use node::{UploadPostNode, CREDENTIAL_NAME};

#[cfg(test)]
mod resolver_tests;

//! The `NodeHost` and `ExecutableNode` traits plus the values that cross
//! between them.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{HostError, NodeError};

// ---------------------------------------------------------------------------
// Values supplied by the host
// ---------------------------------------------------------------------------

/// A secret looked up from the host's credential store.
///
/// The key is never printed; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    api_key: String,
}

impl Credential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into() }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Raw content of a binary attachment on an input item.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryData {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl BinaryData {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            mime_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl fmt::Debug for BinaryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryData")
            .field("len", &self.data.len())
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Values produced by the node
// ---------------------------------------------------------------------------

/// Outcome of processing one item: `{"data": …}` or `{"error": "…"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRecord {
    Data(Value),
    Error(String),
}

/// One output record, paired with the input item it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutput {
    pub item_index: usize,
    #[serde(flatten)]
    pub record: ItemRecord,
}

impl ItemOutput {
    pub fn data(item_index: usize, data: Value) -> Self {
        Self { item_index, record: ItemRecord::Data(data) }
    }

    pub fn error(item_index: usize, message: impl Into<String>) -> Self {
        Self { item_index, record: ItemRecord::Error(message.into()) }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.record, ItemRecord::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Per-run settings the host passes to every node.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// ID of the current execution run, used to correlate logs.
    pub execution_id: Uuid,
    /// When set, item failures become error records instead of aborting.
    pub continue_on_fail: bool,
}

impl ExecutionContext {
    pub fn new(continue_on_fail: bool) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            continue_on_fail,
        }
    }
}

/// What a node may ask of the host that runs it.
#[async_trait]
pub trait NodeHost: Send + Sync {
    /// Number of input items in this run.
    fn item_count(&self) -> usize;

    /// Value of a node parameter for one item, with declared defaults
    /// already applied. `None` when the parameter is not set at all.
    fn parameter(&self, name: &str, item_index: usize) -> Option<Value>;

    /// Look up a credential by name.
    async fn credential(&self, name: &str, item_index: usize) -> Result<Credential, HostError>;

    /// Load the binary attachment stored under `property` on an item.
    async fn binary(&self, item_index: usize, property: &str) -> Result<BinaryData, HostError>;
}

/// The core node trait.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Process every input item the host holds, returning one output per
    /// processed item in input order.
    async fn execute(
        &self,
        host: &dyn NodeHost,
        ctx: &ExecutionContext,
    ) -> Result<Vec<ItemOutput>, NodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_output_serializes_as_data_or_error() {
        let ok = ItemOutput::data(0, json!({ "success": true }));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "item_index": 0, "data": { "success": true } })
        );

        let failed = ItemOutput::error(3, "boom");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "item_index": 3, "error": "boom" })
        );
        assert!(failed.is_error());
    }

    #[test]
    fn credential_debug_hides_key() {
        let cred = Credential::new("super-secret");
        let printed = format!("{cred:?}");
        assert!(!printed.contains("super-secret"));
        assert_eq!(cred.api_key(), "super-secret");
    }

    #[test]
    fn binary_debug_shows_length_not_bytes() {
        let bin = BinaryData::new(vec![1u8, 2, 3]).with_file_name("a.jpg");
        let printed = format!("{bin:?}");
        assert!(printed.contains("len: 3"));
        assert!(printed.contains("a.jpg"));
    }
}

//! `FileHost`: serves node items from a JSON file on disk.
//!
//! The file is an array of `{ "parameters": {…}, "binary": { "<property>": "<path>" } }`.
//! Declared parameter defaults are applied on load. Attachment paths are
//! relative to the items file and are read lazily, when the node asks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use node_api::{BinaryData, Credential, HostError, NodeHost};
use upload_post::{schema, Operation};

#[derive(Debug, Deserialize)]
struct ItemEntry {
    #[serde(default)]
    parameters: Map<String, Value>,
    #[serde(default)]
    binary: HashMap<String, PathBuf>,
}

pub struct FileHost {
    items: Vec<Map<String, Value>>,
    binaries: Vec<HashMap<String, PathBuf>>,
    api_key: Option<String>,
}

impl FileHost {
    /// Read an items file.
    pub async fn load(path: &Path, api_key: Option<String>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read items file {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&content, base_dir, api_key)
            .with_context(|| format!("invalid items file {}", path.display()))
    }

    /// Parse items from JSON text; relative attachment paths are joined to
    /// `base_dir`.
    pub fn from_json(content: &str, base_dir: &Path, api_key: Option<String>) -> Result<Self> {
        let entries: Vec<ItemEntry> =
            serde_json::from_str(content).context("expected a JSON array of items")?;

        let mut items = Vec::with_capacity(entries.len());
        let mut binaries = Vec::with_capacity(entries.len());
        for entry in entries {
            items.push(with_defaults(entry.parameters));
            binaries.push(
                entry.binary
                    .into_iter()
                    .map(|(property, path)| (property, base_dir.join(path)))
                    .collect(),
            );
        }

        Ok(Self { items, binaries, api_key })
    }
}

/// Fill in declared defaults for the item's operation. Items without an
/// operation get the default one; items with an unknown operation are left
/// alone so resolution can report it.
fn with_defaults(mut parameters: Map<String, Value>) -> Map<String, Value> {
    parameters.retain(|_, value| !value.is_null());

    let operation = match parameters.get("operation") {
        None => Some(Operation::UploadPhotos),
        Some(value) => value.as_str().and_then(|s| s.trim().parse().ok()),
    };

    if let Some(operation) = operation {
        for (name, value) in schema::defaults(operation) {
            parameters.entry(name).or_insert(value);
        }
    }
    parameters
}

fn mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        _ => return None,
    };
    Some(mime)
}

#[async_trait]
impl NodeHost for FileHost {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.items.get(item_index)?.get(name).cloned()
    }

    async fn credential(&self, name: &str, _item_index: usize) -> Result<Credential, HostError> {
        self.api_key
            .as_ref()
            .map(Credential::new)
            .ok_or_else(|| HostError::CredentialUnavailable {
                name: name.to_owned(),
                message: "pass --api-key or set UPLOAD_POST_API_KEY".into(),
            })
    }

    async fn binary(&self, item_index: usize, property: &str) -> Result<BinaryData, HostError> {
        let paths = self
            .binaries
            .get(item_index)
            .ok_or(HostError::ItemOutOfRange(item_index))?;
        let path = paths.get(property).ok_or_else(|| HostError::MissingBinary {
            item_index,
            property: property.to_owned(),
        })?;

        let data = tokio::fs::read(path).await.map_err(|e| HostError::BinaryRead {
            property: property.to_owned(),
            message: format!("{}: {e}", path.display()),
        })?;

        let mut binary = BinaryData::new(data);
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            binary = binary.with_file_name(file_name);
        }
        if let Some(mime) = mime_type(path) {
            binary = binary.with_mime_type(mime);
        }
        Ok(binary)
    }
}

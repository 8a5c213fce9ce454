//! `MockHost`: an in-memory test double for `NodeHost`.
//!
//! Holds a fixed list of items, an optional API key and binary attachments,
//! and records every credential and binary lookup a node performs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{BinaryData, Credential, HostError, NodeHost};

/// A mock host that serves programmer-specified items.
pub struct MockHost {
    /// Parameters per item, already including any defaults.
    pub items: Vec<Map<String, Value>>,
    /// API key returned for every credential lookup; `None` fails the lookup.
    pub api_key: Option<String>,
    /// Attachments keyed by `(item_index, property)`.
    pub binaries: HashMap<(usize, String), BinaryData>,
    /// Credential names requested, in call order.
    pub credential_calls: Arc<Mutex<Vec<String>>>,
    /// Binary lookups performed, in call order.
    pub binary_calls: Arc<Mutex<Vec<(usize, String)>>>,
}

impl MockHost {
    /// Create a host with no items that hands out the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            api_key: Some(api_key.into()),
            binaries: HashMap::new(),
            credential_calls: Arc::new(Mutex::new(Vec::new())),
            binary_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a host whose credential store is empty.
    pub fn without_credentials() -> Self {
        Self {
            api_key: None,
            ..Self::with_api_key("")
        }
    }

    /// Append an item. `parameters` must be a JSON object; anything else
    /// adds an item with no parameters.
    pub fn with_item(mut self, parameters: Value) -> Self {
        let params = match parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.items.push(params);
        self
    }

    /// Attach binary content to an item.
    pub fn with_binary(mut self, item_index: usize, property: impl Into<String>, data: BinaryData) -> Self {
        self.binaries.insert((item_index, property.into()), data);
        self
    }

    /// Number of binary lookups performed so far.
    pub fn binary_call_count(&self) -> usize {
        self.binary_calls.lock().unwrap().len()
    }

    /// Number of credential lookups performed so far.
    pub fn credential_call_count(&self) -> usize {
        self.credential_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NodeHost for MockHost {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.items.get(item_index)?.get(name).cloned()
    }

    async fn credential(&self, name: &str, _item_index: usize) -> Result<Credential, HostError> {
        self.credential_calls.lock().unwrap().push(name.to_owned());

        match &self.api_key {
            Some(key) => Ok(Credential::new(key.clone())),
            None => Err(HostError::CredentialUnavailable {
                name: name.to_owned(),
                message: "no credential configured".into(),
            }),
        }
    }

    async fn binary(&self, item_index: usize, property: &str) -> Result<BinaryData, HostError> {
        self.binary_calls
            .lock()
            .unwrap()
            .push((item_index, property.to_owned()));

        if item_index >= self.items.len() {
            return Err(HostError::ItemOutOfRange(item_index));
        }

        self.binaries
            .get(&(item_index, property.to_owned()))
            .cloned()
            .ok_or_else(|| HostError::MissingBinary {
                item_index,
                property: property.to_owned(),
            })
    }
}

//! The Upload-Post workflow node.
//!
//! `UploadPostNode` is the per-item orchestrator:
//! 1. Looks up the `uploadPostApi` credential.
//! 2. Collects the item's parameters from the host.
//! 3. Resolves them into a request (no network on failure).
//! 4. Replaces binary media references with the host's attachment content.
//! 5. Dispatches the request and records the response.
//!
//! Items run one at a time, in input order.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use node_api::{ExecutableNode, ExecutionContext, ItemOutput, NodeError, NodeHost};

use crate::client::UploadPostClient;
use crate::config::ClientConfig;
use crate::models::{MediaReference, PayloadValue, RequestPayload, ResolvedRequest};
use crate::params::ParameterBag;
use crate::resolver::{read_operation, resolve_parameters, COMMON_PARAMETERS};
use crate::rules::parameter_names;
use crate::UploadPostError;

/// Credential type the node asks the host for.
pub const CREDENTIAL_NAME: &str = "uploadPostApi";

pub struct UploadPostNode {
    client: UploadPostClient,
}

impl UploadPostNode {
    pub fn new(client: UploadPostClient) -> Self {
        Self { client }
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, UploadPostError> {
        Ok(Self::new(UploadPostClient::new(config)?))
    }

    pub fn client(&self) -> &UploadPostClient {
        &self.client
    }

    async fn process_item(
        &self,
        host: &dyn NodeHost,
        item_index: usize,
    ) -> Result<Value, UploadPostError> {
        let credential = host.credential(CREDENTIAL_NAME, item_index).await?;
        let api_key = credential.api_key().trim();
        if api_key.is_empty() {
            return Err(UploadPostError::MissingApiKey);
        }

        let mut request = resolve_item(host, item_index)?;
        materialize(host, item_index, &mut request.payload).await?;

        self.client.execute(&request, api_key).await
    }
}

#[async_trait]
impl ExecutableNode for UploadPostNode {
    #[instrument(
        skip(self, host, ctx),
        fields(execution_id = %ctx.execution_id, items = host.item_count())
    )]
    async fn execute(
        &self,
        host: &dyn NodeHost,
        ctx: &ExecutionContext,
    ) -> Result<Vec<ItemOutput>, NodeError> {
        let count = host.item_count();
        let mut outputs = Vec::with_capacity(count);

        for item_index in 0..count {
            match self.process_item(host, item_index).await {
                Ok(data) => {
                    info!("item {} published", item_index);
                    outputs.push(ItemOutput::data(item_index, data));
                }

                Err(err) if ctx.continue_on_fail => {
                    warn!("item {} failed, continuing: {}", item_index, err);
                    outputs.push(ItemOutput::error(item_index, err.to_string()));
                }

                Err(err) => {
                    error!("item {} failed, aborting run: {}", item_index, err);
                    return Err(NodeError::ItemFailed {
                        item_index,
                        kind: err.kind().into(),
                        message: err.to_string(),
                    });
                }
            }
        }

        let failed = outputs.iter().filter(|o| o.is_error()).count();
        info!("processed {} items ({} failed)", outputs.len(), failed);

        Ok(outputs)
    }
}

/// Read every parameter the item's operation can use from the host.
///
/// When `operation` is missing or unknown only the common parameters are
/// read; resolution then reports the bad operation.
pub fn collect_parameters(host: &dyn NodeHost, item_index: usize) -> ParameterBag {
    let mut bag = ParameterBag::new();
    for &name in COMMON_PARAMETERS {
        if let Some(value) = host.parameter(name, item_index) {
            bag.set(name, value);
        }
    }

    let names = read_operation(&bag).map(parameter_names).unwrap_or_default();
    for name in names {
        if let Some(value) = host.parameter(name, item_index) {
            bag.set(name, value);
        }
    }

    bag
}

/// Collect and resolve one item without touching the network or the
/// item's attachments.
pub fn resolve_item(host: &dyn NodeHost, item_index: usize) -> Result<ResolvedRequest, UploadPostError> {
    resolve_parameters(&collect_parameters(host, item_index))
}

async fn materialize(
    host: &dyn NodeHost,
    item_index: usize,
    payload: &mut RequestPayload,
) -> Result<(), UploadPostError> {
    for (_, value) in payload.iter_mut() {
        if let PayloadValue::Media(MediaReference::Binary { property }) = value {
            let binary = host.binary(item_index, property).await?;
            *value = PayloadValue::File(binary);
        }
    }
    Ok(())
}

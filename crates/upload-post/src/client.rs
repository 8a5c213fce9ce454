//! HTTP dispatcher for the Upload-Post API.
//!
//! `UploadPostClient` owns one `reqwest::Client` and the configured base URL.
//! It sends a [`ResolvedRequest`] with the caller's API key and hands back the
//! decoded JSON response. Requests are never retried.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::config::{join_url, ClientConfig};
use crate::models::{BodyEncoding, MediaReference, PayloadValue, RequestPayload, ResolvedRequest};
use crate::UploadPostError;

/// Endpoint answering 200 for a valid API key.
pub const ME_ENDPOINT: &str = "/uploadposts/me";

#[derive(Debug, Clone)]
pub struct UploadPostClient {
    http: Client,
    config: ClientConfig,
}

impl UploadPostClient {
    pub fn new(config: ClientConfig) -> Result<Self, UploadPostError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_url(&self, endpoint: &str) -> String {
        join_url(&self.config.base_url, endpoint)
    }

    fn apply_auth(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Apikey {api_key}"))
            .header(ACCEPT, "application/json")
    }

    /// Send one resolved request and decode the JSON response.
    ///
    /// # Errors
    /// Transport errors for network failures, non-2xx statuses and bodies
    /// that are not JSON. Binary media that were never materialized are
    /// rejected before anything is sent.
    #[instrument(skip_all, fields(operation = %request.operation))]
    pub async fn execute(
        &self,
        request: &ResolvedRequest,
        api_key: &str,
    ) -> Result<Value, UploadPostError> {
        let url = self.build_url(request.endpoint);
        let builder = self.http.request(request.method.clone(), &url);
        let builder = match request.operation.encoding() {
            BodyEncoding::Json => builder.json(&json_body(&request.payload)?),
            BodyEncoding::Multipart => builder.multipart(form_body(&request.payload)?),
        };

        debug!("{} {} ({} fields)", request.method, url, request.payload.len());

        let response = self.apply_auth(builder, api_key).send().await?;
        read_json(response).await
    }

    /// Check an API key against the account endpoint.
    pub async fn verify_api_key(&self, api_key: &str) -> Result<(), UploadPostError> {
        let url = self.build_url(ME_ENDPOINT);
        debug!("GET {}", url);

        let response = self.apply_auth(self.http.get(&url), api_key).send().await?;
        if response.status() != StatusCode::OK {
            return Err(status_error(response).await);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

async fn status_error(response: Response) -> UploadPostError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_owned());
    UploadPostError::Status { status, body }
}

async fn read_json(response: Response) -> Result<Value, UploadPostError> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(UploadPostError::Decode)
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

fn json_body(payload: &RequestPayload) -> Result<Map<String, Value>, UploadPostError> {
    let mut body = Map::new();
    for (key, value) in payload.iter() {
        let json = match value {
            PayloadValue::Text(s) => Value::String(s.clone()),
            PayloadValue::Number(n) => Value::Number(n.clone()),
            PayloadValue::Flag(b) => Value::Bool(*b),
            PayloadValue::List(items) => Value::from(items.clone()),
            PayloadValue::Media(MediaReference::Url { url }) => Value::String(url.clone()),
            PayloadValue::Media(MediaReference::Binary { .. }) | PayloadValue::File(_) => {
                return Err(UploadPostError::BinaryInJsonBody(key.to_owned()))
            }
        };
        body.insert(key.to_owned(), json);
    }
    Ok(body)
}

/// Positional keys (`photos[2]`) collapse to `photos[]`.
fn form_name(key: &str) -> String {
    match key.split_once('[') {
        Some((base, _)) if key.ends_with(']') => format!("{base}[]"),
        _ => key.to_owned(),
    }
}

fn form_body(payload: &RequestPayload) -> Result<Form, UploadPostError> {
    let mut form = Form::new();
    for (key, value) in payload.iter() {
        let name = form_name(key);
        form = match value {
            PayloadValue::Text(s) => form.text(name, s.clone()),
            PayloadValue::Number(n) => form.text(name, n.to_string()),
            PayloadValue::Flag(b) => form.text(name, b.to_string()),
            PayloadValue::List(items) => {
                let name = if name.ends_with("[]") { name } else { format!("{name}[]") };
                items
                    .iter()
                    .fold(form, |form, item| form.text(name.clone(), item.clone()))
            }
            PayloadValue::Media(MediaReference::Url { url }) => form.text(name, url.clone()),
            PayloadValue::Media(MediaReference::Binary { property }) => {
                return Err(UploadPostError::UnresolvedMedia {
                    field: key.to_owned(),
                    property: property.clone(),
                })
            }
            PayloadValue::File(binary) => {
                let file_name = binary
                    .file_name
                    .clone()
                    .unwrap_or_else(|| name.trim_end_matches("[]").to_owned());
                let mut part = Part::bytes(binary.data.clone()).file_name(file_name);
                if let Some(mime) = &binary.mime_type {
                    part = part.mime_str(mime)?;
                }
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

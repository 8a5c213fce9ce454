//! `upload-post` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`               : execute the node over an items file.
//! - `resolve`           : show the request each item would send, without sending it.
//! - `check-credentials` : verify the API key.
//! - `describe`          : print the node's parameter schema.
//!
//! Logs go to stderr; stdout carries only JSON.

mod host;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use node_api::{ExecutableNode, ExecutionContext, NodeHost};
use upload_post::config::{join_url, DEFAULT_BASE_URL};
use upload_post::node::resolve_item;
use upload_post::resolver::payload_preview;
use upload_post::{schema, ClientConfig, UploadPostClient, UploadPostNode};

use crate::host::FileHost;

#[derive(Parser)]
#[command(
    name = "upload-post",
    about = "Publish photos, video and text through the Upload-Post API",
    version
)]
struct Cli {
    /// Upload-Post API key.
    #[arg(long, env = "UPLOAD_POST_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// API base URL.
    #[arg(long, env = "UPLOAD_POST_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Request timeout in seconds; unset waits indefinitely.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish every item in an items file.
    Run {
        /// Path to the items JSON file.
        #[arg(long)]
        input: PathBuf,
        /// Record failed items and keep going instead of aborting.
        #[arg(long)]
        continue_on_fail: bool,
    },
    /// Resolve every item and print the requests without sending them.
    Resolve {
        /// Path to the items JSON file.
        #[arg(long)]
        input: PathBuf,
    },
    /// Check that the API key is accepted.
    CheckCredentials,
    /// Print the node's parameter schema.
    Describe,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::default().with_base_url(self.base_url.clone());
        match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Run { input, continue_on_fail } => {
            let host = FileHost::load(input, cli.api_key.clone()).await?;
            let node = UploadPostNode::with_config(cli.client_config())
                .context("failed to build HTTP client")?;
            let ctx = ExecutionContext::new(*continue_on_fail);

            info!("execution {} publishing {} items", ctx.execution_id, host.item_count());
            let outputs = node.execute(&host, &ctx).await?;
            print_json(&outputs)?;
        }
        Command::Resolve { input } => {
            let host = FileHost::load(input, cli.api_key.clone()).await?;
            let resolved: Vec<Value> = (0..host.item_count())
                .map(|item_index| match resolve_item(&host, item_index) {
                    Ok(request) => json!({
                        "item_index": item_index,
                        "method": request.method.as_str(),
                        "url": join_url(&cli.base_url, request.endpoint),
                        "payload": payload_preview(&request.payload),
                    }),
                    Err(e) => json!({ "item_index": item_index, "error": e.to_string() }),
                })
                .collect();
            print_json(&resolved)?;
        }
        Command::CheckCredentials => {
            let api_key = cli
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .context("no API key: pass --api-key or set UPLOAD_POST_API_KEY")?;
            let client = UploadPostClient::new(cli.client_config())
                .context("failed to build HTTP client")?;
            client
                .verify_api_key(api_key)
                .await
                .context("API key was rejected")?;
            info!("API key accepted by {}", cli.base_url);
            print_json(&json!({ "valid": true }))?;
        }
        Command::Describe => {
            print_json(&schema::describe())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_options_map_onto_client_config() {
        let cli = Cli::try_parse_from([
            "upload-post",
            "--base-url",
            "http://localhost:9000/api",
            "--timeout-secs",
            "30",
            "describe",
        ])
        .unwrap();

        let config = cli.client_config();
        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn run_takes_input_and_fail_mode() {
        let cli = Cli::try_parse_from([
            "upload-post",
            "run",
            "--input",
            "items.json",
            "--continue-on-fail",
            "--api-key",
            "k",
        ])
        .unwrap();

        assert_eq!(cli.api_key.as_deref(), Some("k"));
        match cli.command {
            Command::Run { input, continue_on_fail } => {
                assert_eq!(input, PathBuf::from("items.json"));
                assert!(continue_on_fail);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn resolve_requires_input() {
        assert!(Cli::try_parse_from(["upload-post", "resolve"]).is_err());
    }
}

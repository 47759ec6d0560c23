//! # Call Subcommand
//!
//! Sends one request to a node and prints the response as JSON.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use agora_protocol::{send_request, AgentCard, RequestType, Response};

use crate::attestation::verify_response;

/// Arguments for `agora call`.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Node address (host:port).
    pub addr: String,

    /// Session token issued by the node.
    #[arg(long)]
    pub token: String,

    /// Request type: agent_card, capability_query, or tool_invoke.
    #[arg(value_name = "TYPE")]
    pub request_type: String,

    /// Tool to invoke (tool_invoke only).
    #[arg(long)]
    pub tool: Option<String>,

    /// Tool parameters as a JSON object.
    #[arg(long, value_name = "JSON")]
    pub params: Option<String>,

    /// Check the response attestation against the node's agent card.
    #[arg(long)]
    pub verify: bool,
}

impl CallArgs {
    /// Request payload built from `--tool` and `--params`.
    pub fn payload(&self) -> Result<Map<String, Value>> {
        let mut payload = Map::new();
        if let Some(tool) = &self.tool {
            payload.insert("toolName".into(), Value::String(tool.clone()));
        }
        if let Some(raw) = &self.params {
            let params: Value = serde_json::from_str(raw).context("--params is not valid JSON")?;
            if !params.is_object() {
                bail!("--params must be a JSON object");
            }
            payload.insert("params".into(), params);
        }
        Ok(payload)
    }
}

async fn exchange(
    addr: &str,
    request_type: RequestType,
    token: &str,
    payload: Map<String, Value>,
) -> Result<Response> {
    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;
    let response = send_request(&mut stream, request_type, token, payload)
        .await
        .context("request failed")?;
    // The node closes after responding; a failed shutdown changes nothing.
    let _ = stream.shutdown().await;
    Ok(response)
}

/// Execute `agora call`. Exit code 0 for an `ok` response (and a verified
/// attestation when `--verify` is set), 1 otherwise.
pub async fn run_call(args: &CallArgs) -> Result<u8> {
    let payload = args.payload()?;
    let request_type = RequestType::from(args.request_type.clone());
    let response = exchange(&args.addr, request_type, &args.token, payload).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.is_ok() {
        return Ok(1);
    }
    if !args.verify {
        return Ok(0);
    }

    let card_response = exchange(&args.addr, RequestType::AgentCard, &args.token, Map::new()).await?;
    let card: AgentCard = match (card_response.is_ok(), card_response.result) {
        (true, Some(result)) => serde_json::from_value(result).context("malformed agent card")?,
        _ => bail!(
            "could not fetch agent card: {}",
            card_response.error.unwrap_or_default()
        ),
    };

    if verify_response(&card, &response)? {
        eprintln!("attestation verified for {}", card.did);
        Ok(0)
    } else {
        eprintln!("attestation FAILED verification for {}", card.did);
        Ok(1)
    }
}

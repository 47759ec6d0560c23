//! # Attest Subcommand
//!
//! Offline verification of a saved response against a saved agent card.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::de::DeserializeOwned;

use agora_protocol::{AgentCard, Response};

use crate::attestation::verify_response;

/// Arguments for `agora attest`.
#[derive(Args, Debug)]
pub struct AttestArgs {
    #[command(subcommand)]
    pub command: AttestCommand,
}

#[derive(Subcommand, Debug)]
pub enum AttestCommand {
    /// Verify the attestation on a response (as printed by `agora call`).
    Verify {
        /// Agent card JSON of the node that produced the response.
        #[arg(long, value_name = "FILE")]
        card: PathBuf,
        /// Response JSON.
        #[arg(value_name = "FILE")]
        response: PathBuf,
    },
}

/// Execute `agora attest`.
pub fn run_attest(args: &AttestArgs) -> Result<u8> {
    match &args.command {
        AttestCommand::Verify { card, response } => cmd_verify(card, response),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what}: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid {what}: {}", path.display()))
}

fn cmd_verify(card_path: &Path, response_path: &Path) -> Result<u8> {
    let card: AgentCard = read_json(card_path, "agent card")?;
    let response: Response = read_json(response_path, "response")?;

    if verify_response(&card, &response)? {
        println!("OK: attestation verified for {}", card.did);
        Ok(0)
    } else {
        println!("FAIL: attestation does not verify for {}", card.did);
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Did;
    use serde_json::json;

    #[test]
    fn unattested_response_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let card_path = dir.path().join("card.json");
        let response_path = dir.path().join("response.json");
        let card = AgentCard::new("a", Did::new("did:key:a").unwrap());
        std::fs::write(&card_path, serde_json::to_vec(&card).unwrap()).unwrap();
        std::fs::write(
            &response_path,
            serde_json::to_vec(&Response::ok("r", json!({}))).unwrap(),
        )
        .unwrap();

        let err = cmd_verify(&card_path, &response_path).unwrap_err();
        assert!(err.to_string().contains("no attestation"));
    }

    #[test]
    fn unreadable_files_name_the_path() {
        let err = cmd_verify(Path::new("/nonexistent/card.json"), Path::new("r.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/card.json"));
    }
}
